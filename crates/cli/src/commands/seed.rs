//! Seed the database with demo data.
//!
//! Inserts one customer, two products, and a card on file so the order
//! service can be exercised end to end. Safe to re-run: the customer and
//! card upsert, products are skipped once present.

use sqlx::PgPool;

/// Seed demo data.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset or a statement fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL not set")?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    let customer_id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO customer (email, name)
        VALUES ($1, $2)
        ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        ",
    )
    .bind("jo@example.com")
    .bind("Jo Demo")
    .fetch_one(&pool)
    .await?;

    for (name, price, quantity) in [("Mechanical Keyboard", "49.99", 25), ("Wireless Mouse", "19.99", 40)] {
        let inserted = sqlx::query(
            r"
            INSERT INTO product (name, price, quantity)
            SELECT $1, $2::numeric, $3
            WHERE NOT EXISTS (SELECT 1 FROM product WHERE name = $1)
            ",
        )
        .bind(name)
        .bind(price)
        .bind(quantity)
        .execute(&pool)
        .await?;

        if inserted.rows_affected() > 0 {
            tracing::info!(product = name, "Seeded product");
        }
    }

    sqlx::query(
        r"
        INSERT INTO card (card_no, cvv, valid_till, customer_id)
        VALUES ($1, $2, now() + interval '1 year', $3)
        ON CONFLICT (card_no) DO NOTHING
        ",
    )
    .bind("4111111111117865")
    .bind(737)
    .bind(customer_id)
    .execute(&pool)
    .await?;

    tracing::info!(customer_id, "Seed complete");
    Ok(())
}
