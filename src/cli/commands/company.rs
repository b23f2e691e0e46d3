use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::services::CompanyService;

#[derive(Subcommand)]
pub enum CompanyCommands {
    #[command(about = "Create a new company")]
    Create {
        #[arg(help = "Company display name")]
        name: String,

        #[arg(help = "URL-safe slug (lowercase letters, digits, hyphens)")]
        slug: String,
    },

    #[command(about = "List all companies")]
    List,

    #[command(about = "Deactivate a company (audit history is preserved)")]
    Deactivate {
        #[arg(help = "Company ID")]
        id: Uuid,
    },
}

pub async fn handle(cmd: CompanyCommands, json_output: bool) -> anyhow::Result<()> {
    let service = CompanyService::new().await?;

    match cmd {
        CompanyCommands::Create { name, slug } => {
            let company = service.create_company(&name, &slug).await?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&json!({ "company": company }))?);
            } else {
                println!("Created company '{}' ({}) id={}", company.name, company.slug, company.id);
            }
            Ok(())
        }
        CompanyCommands::List => {
            let companies = service.list_companies().await?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&json!({ "companies": companies }))?);
            } else {
                println!("{:<38} {:<25} {:<20} {}", "ID", "NAME", "SLUG", "ACTIVE");
                println!("{}", "-".repeat(90));
                for company in &companies {
                    println!(
                        "{:<38} {:<25} {:<20} {}",
                        company.id, company.name, company.slug, company.is_active
                    );
                }
            }
            Ok(())
        }
        CompanyCommands::Deactivate { id } => {
            let company = service.deactivate_company(id).await?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&json!({ "company": company }))?);
            } else {
                println!("Deactivated company '{}' ({})", company.name, company.slug);
            }
            Ok(())
        }
    }
}
