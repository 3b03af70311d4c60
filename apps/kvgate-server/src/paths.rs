//! HTTP path constants

pub const SET: &str = "/set";
pub const GET: &str = "/get";
pub const GET_ALL: &str = "/getAll";
pub const DELETE: &str = "/delete";

pub const HEALTH: &str = "/health";
