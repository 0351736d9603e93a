//! Tests for registration, login, profiles and per-user statistics.

mod common;

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};

use api_lib::web::auth::{login_handler, register_handler, LoginRequest, RegisterRequest};
use api_lib::web::error::RequestError;
use api_lib::web::token;
use api_lib::web::users::{
    me_handler, profile_handler, update_me_handler, user_reviews_handler, PageQuery,
    UpdateProfileRequest,
};
use book_review_core::domain::NewReview;
use book_review_core::ports::ReviewStore;
use common::{ctx_for, seed_book, seed_user, test_state, TEST_ADMIN_CODE, TEST_SECRET};

fn register_body(username: &str, admin_code: Option<&str>) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: "hunter2hunter2".to_string(),
        admin_code: admin_code.map(str::to_string),
    }
}

#[tokio::test]
async fn registration_with_the_signup_code_mints_an_admin() {
    let (state, _) = test_state();

    let (status, Json(resp)) = register_handler(
        State(state.clone()),
        Json(register_body("root", Some(TEST_ADMIN_CODE))),
    )
    .await
    .unwrap();
    assert_eq!(status, axum::http::StatusCode::CREATED);
    assert!(resp.user.is_admin);

    // The role is embedded in the credential itself.
    let ctx = token::verify(TEST_SECRET, &resp.token).unwrap();
    assert_eq!(ctx.user_id, resp.user.id);
    assert!(ctx.is_admin);
}

#[tokio::test]
async fn registration_with_a_wrong_code_stays_a_regular_user() {
    let (state, _) = test_state();

    let (_, Json(resp)) = register_handler(
        State(state.clone()),
        Json(register_body("visitor", Some("guessing"))),
    )
    .await
    .unwrap();
    assert!(!resp.user.is_admin);

    let ctx = token::verify(TEST_SECRET, &resp.token).unwrap();
    assert!(!ctx.is_admin);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let (state, _) = test_state();

    register_handler(State(state.clone()), Json(register_body("alice", None)))
        .await
        .unwrap();
    let second =
        register_handler(State(state.clone()), Json(register_body("alice", None))).await;
    assert!(matches!(second, Err(RequestError::Validation(_))));
}

#[tokio::test]
async fn login_verifies_the_password() {
    let (state, _) = test_state();
    register_handler(State(state.clone()), Json(register_body("alice", None)))
        .await
        .unwrap();

    let wrong = login_handler(
        State(state.clone()),
        Json(LoginRequest {
            email: "alice@example.com".to_string(),
            password: "wrong-password".to_string(),
        }),
    )
    .await;
    assert!(matches!(wrong, Err(RequestError::Validation(_))));

    let unknown = login_handler(
        State(state.clone()),
        Json(LoginRequest {
            email: "nobody@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
        }),
    )
    .await;
    assert!(matches!(unknown, Err(RequestError::Validation(_))));

    let Json(resp) = login_handler(
        State(state.clone()),
        Json(LoginRequest {
            email: "alice@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(resp.user.username, "alice");
    assert!(token::verify(TEST_SECRET, &resp.token).is_ok());
}

#[tokio::test]
async fn a_user_with_no_reviews_has_all_zero_stats() {
    let (state, _) = test_state();
    let alice = seed_user(&state, "alice", false).await;

    let Json(me) = me_handler(State(state.clone()), Extension(ctx_for(&alice)))
        .await
        .unwrap();
    assert_eq!(me.stats.total_reviews, 0);
    assert_eq!(me.stats.unique_books_reviewed, 0);
    assert_eq!(me.stats.average_rating, 0.0);
}

#[tokio::test]
async fn profile_carries_recent_reviews_and_stats() {
    let (state, _) = test_state();
    let alice = seed_user(&state, "alice", false).await;
    let dune = seed_book(&state, "Dune").await;
    let hobbit = seed_book(&state, "The Hobbit").await;

    for (book, rating) in [(&dune, 4), (&hobbit, 5)] {
        state
            .reviews
            .create_review(NewReview {
                book_id: book.id,
                user_id: alice.id,
                rating,
                comment: "worth staying up late for".to_string(),
            })
            .await
            .unwrap();
    }

    let Json(profile) = profile_handler(State(state.clone()), Path(alice.id))
        .await
        .unwrap();
    assert_eq!(profile.user.username, "alice");
    assert_eq!(profile.reviews.len(), 2);
    assert!(profile
        .reviews
        .iter()
        .any(|r| r.book_title == "Dune"));
    assert_eq!(profile.stats.total_reviews, 2);
    assert_eq!(profile.stats.unique_books_reviewed, 2);
    // (4 + 5) / 2 = 4.5
    assert_eq!(profile.stats.average_rating, 4.5);
}

#[tokio::test]
async fn missing_profile_is_not_found() {
    let (state, _) = test_state();
    let result = profile_handler(State(state.clone()), Path(uuid::Uuid::new_v4())).await;
    assert!(matches!(result, Err(RequestError::NotFound(_))));
}

#[tokio::test]
async fn user_reviews_paginate() {
    let (state, _) = test_state();
    let alice = seed_user(&state, "alice", false).await;

    for i in 0..3 {
        let book = seed_book(&state, &format!("Book {i}")).await;
        state
            .reviews
            .create_review(NewReview {
                book_id: book.id,
                user_id: alice.id,
                rating: 3,
                comment: "perfectly adequate reading".to_string(),
            })
            .await
            .unwrap();
    }

    let Json(page1) = user_reviews_handler(
        State(state.clone()),
        Path(alice.id),
        Query(PageQuery {
            page: Some(1),
            limit: Some(2),
        }),
    )
    .await
    .unwrap();
    assert_eq!(page1.reviews.len(), 2);
    assert_eq!(page1.pagination.current, 1);
    assert_eq!(page1.pagination.total, 2);
    assert!(page1.pagination.has_next);
    assert!(!page1.pagination.has_prev);

    let Json(page2) = user_reviews_handler(
        State(state.clone()),
        Path(alice.id),
        Query(PageQuery {
            page: Some(2),
            limit: Some(2),
        }),
    )
    .await
    .unwrap();
    assert_eq!(page2.reviews.len(), 1);
    assert!(!page2.pagination.has_next);
    assert!(page2.pagination.has_prev);
}

#[tokio::test]
async fn profile_updates_are_validated() {
    let (state, _) = test_state();
    let alice = seed_user(&state, "alice", false).await;

    let short_name = update_me_handler(
        State(state.clone()),
        Extension(ctx_for(&alice)),
        Json(UpdateProfileRequest {
            name: Some("J".to_string()),
            bio: None,
        }),
    )
    .await;
    assert!(matches!(short_name, Err(RequestError::Validation(_))));

    let long_bio = update_me_handler(
        State(state.clone()),
        Extension(ctx_for(&alice)),
        Json(UpdateProfileRequest {
            name: None,
            bio: Some("x".repeat(501)),
        }),
    )
    .await;
    assert!(matches!(long_bio, Err(RequestError::Validation(_))));

    let Json(updated) = update_me_handler(
        State(state.clone()),
        Extension(ctx_for(&alice)),
        Json(UpdateProfileRequest {
            name: Some("Alice Liddell".to_string()),
            bio: Some("Reads more than she sleeps.".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(updated.name.as_deref(), Some("Alice Liddell"));
    assert_eq!(updated.bio.as_deref(), Some("Reads more than she sleeps."));
}
