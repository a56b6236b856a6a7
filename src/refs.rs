//! Existence checks for the foreign references a request includes.
//!
//! Writes that point at other rows collect their references as an ordered
//! list of [`RefCheck`]s and run them through [`verify_references`] before
//! the mutating statement executes. Checks run sequentially and stop at the
//! first reference that does not resolve.

use diesel::dsl::exists;
use diesel::prelude::*;

use crate::errors::ApiError;
use crate::schema::{consultas, pacientes, usuarios};

/// The kinds of rows a payload can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Paciente,
    Usuario,
    Consulta,
}

impl RefKind {
    /// Wire name of the reference column, as clients submit it.
    pub fn column(&self) -> &'static str {
        match self {
            RefKind::Paciente => "ID_PACIENTE",
            RefKind::Usuario => "ID_USUARIO",
            RefKind::Consulta => "ID_CONSULTA",
        }
    }
}

/// One reference to confirm against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefCheck {
    pub kind: RefKind,
    pub id: i32,
}

impl RefCheck {
    pub fn paciente(id: i32) -> Self {
        RefCheck { kind: RefKind::Paciente, id }
    }

    pub fn usuario(id: i32) -> Self {
        RefCheck { kind: RefKind::Usuario, id }
    }

    pub fn consulta(id: i32) -> Self {
        RefCheck { kind: RefKind::Consulta, id }
    }
}

/// Confirms each reference in order; the first miss aborts with the 400 the
/// caller reports. Absent optional references are simply not passed in.
pub fn verify_references(conn: &mut PgConnection, checks: &[RefCheck]) -> Result<(), ApiError> {
    for check in checks {
        let found = match check.kind {
            RefKind::Paciente => {
                diesel::select(exists(pacientes::table.find(check.id))).get_result::<bool>(conn)?
            }
            RefKind::Usuario => {
                diesel::select(exists(usuarios::table.find(check.id))).get_result::<bool>(conn)?
            }
            RefKind::Consulta => {
                diesel::select(exists(consultas::table.find(check.id))).get_result::<bool>(conn)?
            }
        };
        if !found {
            return Err(ApiError::ReferenceNotFound(check.kind));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_match_the_wire_names() {
        assert_eq!(RefKind::Paciente.column(), "ID_PACIENTE");
        assert_eq!(RefKind::Usuario.column(), "ID_USUARIO");
        assert_eq!(RefKind::Consulta.column(), "ID_CONSULTA");
    }

    #[test]
    fn constructors_tag_the_kind() {
        assert_eq!(RefCheck::paciente(3).kind, RefKind::Paciente);
        assert_eq!(RefCheck::usuario(3).kind, RefKind::Usuario);
        assert_eq!(RefCheck::consulta(3).kind, RefKind::Consulta);
    }
}
