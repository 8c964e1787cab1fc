//! Módulo de acesso ao banco legado
//!
//! Conexão por operação, introspecção de metadados, mapeamento de
//! registros, geração de ids e as operações CRUD genéricas.

pub mod connection;
pub mod idgen;
pub mod metadata;
pub mod ops;
pub mod record;

pub use connection::{abrir_conexao, verificar_conexao};
pub use record::{Registro, SqlValue};
