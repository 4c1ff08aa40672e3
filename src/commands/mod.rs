pub mod decode;
pub mod freebusy;
pub mod from_rrule;
pub mod to_rrule;
