//! Password hashing (`password`) and access/refresh tokens (`jwt`).

pub mod jwt;
pub mod password;
