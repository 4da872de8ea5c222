pub mod session_api;

pub use session_api::{
    await_established, end_active_session, establish_active, start_as_creator, start_as_joiner,
};
