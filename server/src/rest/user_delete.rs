// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! API to delete a user.

use crate::driver::Driver;
use axum::Json;
use axum::extract::{Path, State};
use usrmgr_authn::model::UserId;
use usrmgr_core::rest::{EmptyBody, MessageResponse, RestError};

/// DELETE handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<String>,
    _: EmptyBody,
) -> Result<Json<MessageResponse>, RestError> {
    let id = UserId::parse(&id)?;

    driver.delete_user(id).await?;

    Ok(Json(MessageResponse::new(format!("User with ID {} deleted successfully", id.as_i64()))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use axum::http;
    use usrmgr_core::rest::testutils::*;
    use usrmgr_core::test_payload_must_be_empty;

    fn route<T: std::fmt::Display>(id: T) -> (http::Method, String) {
        (http::Method::DELETE, format!("/users/{}", id))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let token = context.access_token("111").await;
        let user = context.create_test_user("222").await;
        let id = user.id().as_i64();

        let response = OneShotBuilder::new(context.app(), route(id))
            .with_bearer_auth(&token)
            .send_empty()
            .await
            .expect_json::<MessageResponse>()
            .await;
        assert_eq!(format!("User with ID {} deleted successfully", id), response.message);

        assert!(context.get_user("111").await.is_some());
        assert!(context.get_user("222").await.is_none());
    }

    #[tokio::test]
    async fn test_self_delete_keeps_token_valid() {
        let context = TestContext::setup().await;

        let token = context.access_token("111").await;
        let user = context.get_user("111").await.unwrap();

        OneShotBuilder::new(context.app(), route(user.id().as_i64()))
            .with_bearer_auth(&token)
            .send_empty()
            .await
            .expect_json::<MessageResponse>()
            .await;

        // Tokens are not revocable so the caller can still reach protected APIs.
        OneShotBuilder::new(context.app(), route(user.id().as_i64()))
            .with_bearer_auth(&token)
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("User not found")
            .await;
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;

        let token = context.access_token("111").await;

        OneShotBuilder::new(context.into_app(), route(12345))
            .with_bearer_auth(&token)
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("User not found")
            .await;
    }

    #[tokio::test]
    async fn test_bad_id() {
        let context = TestContext::setup().await;

        let token = context.access_token("111").await;

        OneShotBuilder::new(context.into_app(), route("-3"))
            .with_bearer_auth(&token)
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Invalid user ID -3")
            .await;
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let context = TestContext::setup().await;

        let user = context.create_test_user("111").await;

        OneShotBuilder::new(context.app(), route(user.id().as_i64()))
            .with_bearer_auth("garbage")
            .send_empty()
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("Invalid access token")
            .await;

        assert!(context.get_user("111").await.is_some());
    }

    test_payload_must_be_empty!(
        TestContext::setup().await.into_app(),
        route(1),
        TestContext::setup().await.access_token("111").await
    );
}
