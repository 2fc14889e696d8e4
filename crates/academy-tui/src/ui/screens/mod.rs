pub mod forms;
pub mod materials;
pub mod users;
