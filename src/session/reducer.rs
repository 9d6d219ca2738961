use crate::mvi::Reducer;

use super::intent::SessionIntent;
use super::state::SessionState;

pub struct SessionReducer;

impl Reducer for SessionReducer {
    type State = SessionState;
    type Intent = SessionIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            SessionIntent::Restored(restored) => match state {
                SessionState::Loading => match restored {
                    Some(session) => SessionState::Authenticated(session),
                    None => SessionState::Unauthenticated,
                },
                // A login or logout already resolved the session
                other => other,
            },
            SessionIntent::LoggedIn(session) => SessionState::Authenticated(session),
            SessionIntent::LoggedOut | SessionIntent::Unauthorized => {
                SessionState::Unauthenticated
            }
        }
    }
}
