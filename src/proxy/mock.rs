//! Mock collaborators for isolating the executor and services in tests.

use mockall::mock;

use crate::models::auth::TokenProvider;

mock! {
    pub Tokens {}

    impl TokenProvider for Tokens {
        fn bearer_token(&self) -> Option<String>;
    }
}
