//! Demo data for local development.
//!
//! Seeds a handful of organizations in different plan states on top of the
//! catalog that the initial migration inserts, then prints session tokens for
//! each role so the API can be exercised with curl.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use backoffice_core::entitlement::TierModuleMap;
use backoffice_core::tier::PlanTier;
use backoffice_db::{
    PlanChangeRepository,
    entities::{organizations, plans, sea_orm_active_enums::OrganizationStatus},
};
use backoffice_shared::types::{OrganizationId, PlanId, UserId};
use backoffice_shared::{AppConfig, JwtService, Role};

/// Organization that hosts the platform admin.
const PLATFORM_ORG_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Active organization on the seed plan.
const SEED_ORG_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Grow organization with a pending request for pro.
const PENDING_ORG_ID: &str = "00000000-0000-0000-0000-000000000003";
/// Organization whose registration is not yet approved.
const UNAPPROVED_ORG_ID: &str = "00000000-0000-0000-0000-000000000004";
/// User recorded as the actor of seeded plan changes.
const SEED_USER_ID: &str = "00000000-0000-0000-0000-0000000000aa";

struct DemoOrg {
    id: &'static str,
    name: &'static str,
    email: &'static str,
    status: OrganizationStatus,
    plan: Option<PlanTier>,
    requested: Option<PlanTier>,
}

const DEMO_ORGS: [DemoOrg; 4] = [
    DemoOrg {
        id: PLATFORM_ORG_ID,
        name: "Backoffice HQ",
        email: "platform@backoffice.local",
        status: OrganizationStatus::Active,
        plan: Some(PlanTier::Enterprise),
        requested: None,
    },
    DemoOrg {
        id: SEED_ORG_ID,
        name: "Northwind Clinic",
        email: "owner@northwind.test",
        status: OrganizationStatus::Active,
        plan: Some(PlanTier::Seed),
        requested: None,
    },
    DemoOrg {
        id: PENDING_ORG_ID,
        name: "Harbor Labs",
        email: "admin@harbor.test",
        status: OrganizationStatus::Active,
        plan: Some(PlanTier::Grow),
        requested: Some(PlanTier::Pro),
    },
    DemoOrg {
        id: UNAPPROVED_ORG_ID,
        name: "Fresh Signup Ltd",
        email: "hello@fresh.test",
        status: OrganizationStatus::Pending,
        plan: None,
        requested: None,
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let map = TierModuleMap::from_config(&config.entitlement)?;

    println!("Connecting to database...");
    let db = backoffice_db::connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    println!("Seeding demo organizations...");
    for org in &DEMO_ORGS {
        seed_organization(&db, org, &map).await?;
    }

    println!("Development session tokens:");
    let jwt = JwtService::new(config.jwt.clone());
    for (label, org, role) in [
        ("platform admin", PLATFORM_ORG_ID, Role::SuperAdmin),
        ("Northwind admin", SEED_ORG_ID, Role::Admin),
        ("Harbor member", PENDING_ORG_ID, Role::Member),
    ] {
        let token = jwt.issue_session(Uuid::now_v7(), Uuid::parse_str(org)?, role)?;
        println!("  {label} ({role}):\n    {token}");
    }

    println!("Seeding complete!");
    Ok(())
}

async fn plan_for(db: &DatabaseConnection, tier: PlanTier) -> anyhow::Result<PlanId> {
    let plan = plans::Entity::find()
        .filter(plans::Column::Tier.eq(tier.as_str()))
        .filter(plans::Column::IsActive.eq(true))
        .one(db)
        .await?
        .with_context(|| format!("No active {tier} plan in the catalog; run the migrator first"))?;
    Ok(PlanId::from_uuid(plan.id))
}

async fn seed_organization(
    db: &DatabaseConnection,
    demo: &DemoOrg,
    map: &TierModuleMap,
) -> anyhow::Result<()> {
    let id = Uuid::parse_str(demo.id)?;
    if organizations::Entity::find_by_id(id).one(db).await?.is_some() {
        println!("  {} already exists, skipping...", demo.name);
        return Ok(());
    }

    let now = Utc::now().into();
    organizations::ActiveModel {
        id: Set(id),
        name: Set(demo.name.to_string()),
        email: Set(demo.email.to_string()),
        status: Set(demo.status),
        plan_id: Set(None),
        plan_tier: Set(None),
        requested_plan_id: Set(None),
        plan_requested_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    let org_id = OrganizationId::from_uuid(id);
    let actor = UserId::from_uuid(Uuid::parse_str(SEED_USER_ID)?);
    let repo = PlanChangeRepository::new(db.clone());

    if let Some(tier) = demo.plan {
        let outcome = repo
            .set_organization_plan(org_id, plan_for(db, tier).await?, actor, map)
            .await?;
        println!(
            "  Created {} on {} with {} modules",
            demo.name,
            tier,
            outcome.modules_added.len()
        );
    } else {
        println!("  Created {} ({:?})", demo.name, demo.status);
    }

    if let Some(tier) = demo.requested {
        repo.request(org_id, plan_for(db, tier).await?, actor).await?;
        println!("    {} requested {}", demo.name, tier);
    }

    Ok(())
}
