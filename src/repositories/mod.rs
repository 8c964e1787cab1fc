//! Repositórios por tabela do banco legado

pub mod objeto_repository;
pub mod ordem_repository;

pub use objeto_repository::ObjetoRepository;
pub use ordem_repository::OrdemRepository;
