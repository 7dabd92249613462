use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::reviews::{CreateReviewRequest, ReviewList, UpdateReviewRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthMember,
    models::Review,
    policy::{self, Action},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::book_service,
};

pub async fn create(
    pool: &DbPool,
    caller: &AuthMember,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    policy::ensure(caller, Action::ReviewWrite, None)?;
    validate_stars(payload.stars)?;
    book_service::get_book(pool, payload.book_id).await?;

    let existing: Option<Review> =
        sqlx::query_as("SELECT * FROM reviews WHERE user_id = $1 AND book_id = $2")
            .bind(caller.member_id)
            .bind(payload.book_id)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "Review already exists for this book".into(),
        ));
    }

    let review: Review = sqlx::query_as(
        r#"
        INSERT INTO reviews (user_id, book_id, stars, description, review_date)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(caller.member_id)
    .bind(payload.book_id)
    .bind(payload.stars)
    .bind(&payload.description)
    .bind(payload.review_date)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Review created",
        review,
        Some(Meta::empty()),
    ))
}

pub async fn find_by_book(
    pool: &DbPool,
    book_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ReviewList>> {
    book_service::get_book(pool, book_id).await?;
    let (page, limit, offset) = pagination.normalize();

    let items: Vec<Review> = sqlx::query_as(
        r#"
        SELECT * FROM reviews
        WHERE book_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(book_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE book_id = $1")
        .bind(book_id)
        .fetch_one(pool)
        .await?;

    let meta = Meta::paged(page, limit, total);
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

pub async fn find_mine(pool: &DbPool, caller: &AuthMember) -> AppResult<ApiResponse<ReviewList>> {
    policy::ensure(caller, Action::ReviewWrite, None)?;

    let items: Vec<Review> =
        sqlx::query_as("SELECT * FROM reviews WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(caller.member_id)
            .fetch_all(pool)
            .await?;

    Ok(ApiResponse::success("Reviews", ReviewList { items }, None))
}

pub async fn update(
    pool: &DbPool,
    caller: &AuthMember,
    book_id: Uuid,
    patch: UpdateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    policy::ensure(caller, Action::ReviewWrite, None)?;
    if let Some(stars) = patch.stars {
        validate_stars(stars)?;
    }

    let review = get_review(pool, caller.member_id, book_id).await?;

    let updated: Review = sqlx::query_as(
        r#"
        UPDATE reviews SET
            stars = COALESCE($3, stars),
            description = COALESCE($4, description),
            review_date = COALESCE($5, review_date)
        WHERE user_id = $1 AND book_id = $2
        RETURNING *
        "#,
    )
    .bind(review.user_id)
    .bind(review.book_id)
    .bind(patch.stars)
    .bind(patch.description)
    .bind(patch.review_date)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Review updated",
        updated,
        Some(Meta::empty()),
    ))
}

pub async fn remove(
    pool: &DbPool,
    caller: &AuthMember,
    book_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    policy::ensure(caller, Action::ReviewWrite, None)?;
    let review = get_review(pool, caller.member_id, book_id).await?;

    sqlx::query("DELETE FROM reviews WHERE user_id = $1 AND book_id = $2")
        .bind(review.user_id)
        .bind(review.book_id)
        .execute(pool)
        .await?;

    Ok(ApiResponse::success(
        "Review deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn get_review(pool: &DbPool, user_id: Uuid, book_id: Uuid) -> AppResult<Review> {
    let review: Option<Review> =
        sqlx::query_as("SELECT * FROM reviews WHERE user_id = $1 AND book_id = $2")
            .bind(user_id)
            .bind(book_id)
            .fetch_optional(pool)
            .await?;
    review.ok_or_else(|| AppError::NotFound("Review not found".into()))
}

fn validate_stars(stars: i32) -> AppResult<()> {
    if !(1..=5).contains(&stars) {
        return Err(AppError::BadRequest("Stars must be between 1 and 5".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_stay_within_one_to_five() {
        assert!(validate_stars(0).is_err());
        assert!(validate_stars(1).is_ok());
        assert!(validate_stars(5).is_ok());
        assert!(validate_stars(6).is_err());
    }
}
