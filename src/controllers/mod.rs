//! Controllers da aplicação

pub mod objeto_controller;
pub mod ordem_controller;

pub use objeto_controller::ObjetoController;
pub use ordem_controller::OrdemController;
