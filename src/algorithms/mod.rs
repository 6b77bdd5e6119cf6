pub mod common;
pub mod discords;
pub mod stampi;
pub mod stomp;
