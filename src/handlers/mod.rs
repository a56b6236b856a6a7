pub mod citas;
pub mod consultas;
pub mod documentos;
pub mod pacientes;
pub mod recetas;
pub mod usuarios;
