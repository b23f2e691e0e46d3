use anyhow::Context;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::database::manager::Db;
use crate::database::models::LeadStatus;

const DEMO_COMPANIES: [(&str, &str); 5] = [
    ("Acme Corporation", "acme"),
    ("Umbrella Ltda", "umbrella"),
    ("Initech Solutions", "initech"),
    ("Globex do Brasil", "globex"),
    ("Stark Industries", "stark"),
];

const LEAD_STATUSES: [LeadStatus; 5] = [
    LeadStatus::New,
    LeadStatus::Contacted,
    LeadStatus::Qualified,
    LeadStatus::Converted,
    LeadStatus::Lost,
];

/// Populate demo data for development: companies, users and leads. Prints a
/// dev JWT per company so the API can be exercised immediately.
pub async fn handle(
    companies: usize,
    users_per_company: usize,
    leads_per_company: usize,
    clear: bool,
) -> anyhow::Result<()> {
    let pool = Db::pool().await.context("database connection required for seeding")?;

    if clear {
        // Child rows first; audit entries reference nothing with FK
        // constraints but clearing them keeps the trail consistent with the
        // recreated data.
        sqlx::query("DELETE FROM audit_entries").execute(&pool).await?;
        sqlx::query("DELETE FROM leads").execute(&pool).await?;
        sqlx::query("DELETE FROM users").execute(&pool).await?;
        sqlx::query("DELETE FROM companies").execute(&pool).await?;
        println!("Cleared existing data");
    }

    let count = companies.min(DEMO_COMPANIES.len());
    if count < companies {
        println!("Only {} demo companies are defined, seeding {}", DEMO_COMPANIES.len(), count);
    }
    for (name, slug) in DEMO_COMPANIES.iter().take(count) {
        let company_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO companies (id, name, slug, is_active) VALUES ($1, $2, $3, true)",
        )
        .bind(company_id)
        .bind(name)
        .bind(slug)
        .execute(&pool)
        .await?;

        let mut first_user: Option<(Uuid, String)> = None;
        for n in 1..=users_per_company {
            let user_id = Uuid::new_v4();
            let email = format!("user{}@{}.test", n, slug);
            // Credential hashes belong to the auth subsystem; demo users get
            // an unusable placeholder.
            sqlx::query(
                r#"
                INSERT INTO users (id, email, password_hash, company_id, is_active)
                VALUES ($1, $2, '!', $3, true)
                "#,
            )
            .bind(user_id)
            .bind(&email)
            .bind(company_id)
            .execute(&pool)
            .await?;

            if first_user.is_none() {
                first_user = Some((user_id, email));
            }
        }

        for n in 1..=leads_per_company {
            let status = LEAD_STATUSES[(n - 1) % LEAD_STATUSES.len()];
            sqlx::query(
                r#"
                INSERT INTO leads (id, company_id, name, email, phone, client_company, status, source)
                VALUES ($1, $2, $3, $4, $5, $6, $7, 'seed')
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(format!("Lead {} {}", n, name))
            .bind(format!("lead{}@{}.test", n, slug))
            .bind(format!("+55 11 9{:04}-{:04}", n, n))
            .bind(format!("Cliente {} SA", n))
            .bind(status.as_str())
            .execute(&pool)
            .await?;
        }

        println!(
            "Seeded company '{}' ({}) with {} users, {} leads",
            name, slug, users_per_company, leads_per_company
        );

        if let Some((user_id, email)) = first_user {
            match generate_jwt(Claims::new(user_id, email.clone(), "user".to_string())) {
                Ok(token) => {
                    println!("  try: curl -H 'Authorization: Bearer {}' \\", token);
                    println!("            -H 'X-Company-Id: {}' http://localhost:3000/api/leads", slug);
                }
                Err(e) => println!("  (no dev token: {})", e),
            }
        }
    }

    Ok(())
}
