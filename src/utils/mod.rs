pub mod alphabet;
pub mod genetic_code;
pub mod hash;
pub mod io;
pub mod matrix;
