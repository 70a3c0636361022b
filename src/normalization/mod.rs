pub mod country;
pub mod cuisine;
