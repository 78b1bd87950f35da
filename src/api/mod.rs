pub mod case;
pub mod employee;

use serde::Serialize;

/// Success half of the response envelope: `{"success": true, "data": ...}`.
#[derive(Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
