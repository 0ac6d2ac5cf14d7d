/// Uninhabited return type for loops that never finish; `!` is not stable in this position.
#[derive(Debug)]
pub enum Never {}
