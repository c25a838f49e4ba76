//! Initial database migration.
//!
//! Creates the entitlement schema: catalog tables, organizations, grants,
//! plan history, RLS policies, and the default plan/module catalog.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CATALOG
        // ============================================================
        db.execute_unprepared(PLANS_SQL).await?;
        db.execute_unprepared(MODULES_SQL).await?;
        db.execute_unprepared(MODULE_PLANS_SQL).await?;
        db.execute_unprepared(PLAN_MODULES_SQL).await?;

        // ============================================================
        // PART 3: TENANTS & GRANTS
        // ============================================================
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(ORGANIZATION_MODULES_SQL).await?;
        db.execute_unprepared(PLAN_HISTORY_SQL).await?;

        // ============================================================
        // PART 4: TRIGGERS & RLS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;
        db.execute_unprepared(RLS_SQL).await?;

        // ============================================================
        // PART 5: DEFAULT CATALOG
        // ============================================================
        db.execute_unprepared(CATALOG_SEED_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE organization_status AS ENUM (
    'pending',
    'approved',
    'rejected',
    'active',
    'pending_plan_change'
);

CREATE TYPE plan_tier AS ENUM ('free', 'seed', 'grow', 'pro', 'enterprise');

CREATE TYPE grant_status AS ENUM ('active', 'inactive', 'expired');

CREATE TYPE plan_history_kind AS ENUM ('upgrade', 'downgrade', 'same', 'rejected');

CREATE TYPE billing_cycle AS ENUM ('monthly', 'yearly');
";

const PLANS_SQL: &str = r"
CREATE TABLE plans (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL UNIQUE,
    -- Text rather than plan_tier: validated against the tier order at startup
    tier VARCHAR(32) NOT NULL,
    price NUMERIC(12, 2) NOT NULL DEFAULT 0,
    features JSONB NOT NULL DEFAULT '[]',
    max_records INTEGER,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_plan_price_non_negative CHECK (price >= 0),
    CONSTRAINT chk_plan_max_records_positive CHECK (max_records IS NULL OR max_records > 0)
);

CREATE INDEX idx_plans_tier ON plans(tier);
";

const MODULES_SQL: &str = r"
CREATE TABLE modules (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    module_type VARCHAR(64) NOT NULL,
    description TEXT,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_modules_type ON modules(module_type);
";

const MODULE_PLANS_SQL: &str = r"
CREATE TABLE module_plans (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    module_id UUID NOT NULL REFERENCES modules(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    price NUMERIC(12, 2) NOT NULL DEFAULT 0,
    billing_cycle billing_cycle NOT NULL DEFAULT 'monthly',
    features JSONB NOT NULL DEFAULT '[]',
    max_users INTEGER,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_module_plan_price_non_negative CHECK (price >= 0)
);

CREATE INDEX idx_module_plans_module ON module_plans(module_id);
";

const PLAN_MODULES_SQL: &str = r"
CREATE TABLE plan_modules (
    plan_id UUID NOT NULL REFERENCES plans(id) ON DELETE CASCADE,
    module_id UUID NOT NULL REFERENCES modules(id) ON DELETE CASCADE,
    PRIMARY KEY (plan_id, module_id)
);
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    status organization_status NOT NULL DEFAULT 'pending',
    plan_id UUID REFERENCES plans(id),
    plan_tier plan_tier,
    requested_plan_id UUID REFERENCES plans(id),
    plan_requested_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    -- A request is outstanding exactly while the status says so
    CONSTRAINT chk_requested_plan_matches_status CHECK (
        (requested_plan_id IS NOT NULL) = (status = 'pending_plan_change')
    ),
    CONSTRAINT chk_plan_tier_with_plan CHECK (
        (plan_id IS NULL) = (plan_tier IS NULL)
    )
);

CREATE INDEX idx_organizations_status ON organizations(status);
CREATE INDEX idx_organizations_pending_plan ON organizations(plan_requested_at)
    WHERE requested_plan_id IS NOT NULL;
";

const ORGANIZATION_MODULES_SQL: &str = r"
CREATE TABLE organization_modules (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id),
    module_id UUID NOT NULL REFERENCES modules(id),
    is_active BOOLEAN NOT NULL DEFAULT true,
    status grant_status NOT NULL DEFAULT 'active',
    start_date TIMESTAMPTZ NOT NULL DEFAULT now(),
    end_date TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_organization_module UNIQUE (organization_id, module_id),
    CONSTRAINT chk_grant_dates CHECK (end_date IS NULL OR end_date >= start_date)
);

CREATE INDEX idx_organization_modules_org ON organization_modules(organization_id);
";

const PLAN_HISTORY_SQL: &str = r"
CREATE TABLE plan_history (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id),
    kind plan_history_kind NOT NULL,
    previous_plan_id UUID REFERENCES plans(id),
    new_plan_id UUID REFERENCES plans(id),
    previous_tier plan_tier,
    new_tier plan_tier,
    reason TEXT,
    changed_by UUID NOT NULL,
    changed_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_history_transition_has_target CHECK (
        kind = 'rejected' OR (new_plan_id IS NOT NULL AND new_tier IS NOT NULL)
    )
);

CREATE INDEX idx_plan_history_org ON plan_history(organization_id, changed_at);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_plans_updated_at BEFORE UPDATE ON plans
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_modules_updated_at BEFORE UPDATE ON modules
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_module_plans_updated_at BEFORE UPDATE ON module_plans
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_organizations_updated_at BEFORE UPDATE ON organizations
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_organization_modules_updated_at BEFORE UPDATE ON organization_modules
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

-- Plan history is append-only
CREATE OR REPLACE FUNCTION reject_plan_history_mutation()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'plan_history is append-only';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_plan_history_append_only BEFORE UPDATE OR DELETE ON plan_history
    FOR EACH ROW EXECUTE FUNCTION reject_plan_history_mutation();
";

const RLS_SQL: &str = r"
-- ============================================================
-- ROW-LEVEL SECURITY POLICIES
-- Tenant tables are visible to the organization in
-- app.current_organization_id, or to platform admin work that
-- sets app.platform_admin = 'on'. A pooled connection keeps an empty
-- tenant setting after SET LOCAL ends, hence the NULLIF.
-- ============================================================

ALTER TABLE organization_modules ENABLE ROW LEVEL SECURITY;
ALTER TABLE plan_history ENABLE ROW LEVEL SECURITY;

-- Apply the policies to the table owner as well.
ALTER TABLE organization_modules FORCE ROW LEVEL SECURITY;
ALTER TABLE plan_history FORCE ROW LEVEL SECURITY;

CREATE POLICY tenant_isolation ON organization_modules
    USING (organization_id = NULLIF(current_setting('app.current_organization_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON plan_history
    USING (organization_id = NULLIF(current_setting('app.current_organization_id', true), '')::UUID);

CREATE POLICY platform_admin ON organization_modules
    USING (current_setting('app.platform_admin', true) = 'on');

CREATE POLICY platform_admin ON plan_history
    USING (current_setting('app.platform_admin', true) = 'on');
";

const CATALOG_SEED_SQL: &str = r#"
INSERT INTO plans (name, tier, price, features, max_records) VALUES
    ('Free', 'free', 0, '["Dashboard", "Onboarding"]', 100),
    ('Seed', 'seed', 29, '["Support desk", "Notifications"]', 1000),
    ('Grow', 'grow', 79, '["Payments", "Reports"]', 10000),
    ('Pro', 'pro', 199, '["Lab", "Production"]', 100000),
    ('Enterprise', 'enterprise', 499, '["Pharmacy", "Audit log"]', NULL);

INSERT INTO modules (name, module_type, description) VALUES
    ('Dashboard', 'dashboard', 'Organization overview'),
    ('Onboarding', 'onboarding', 'Guided setup'),
    ('Support', 'support', 'Support tickets'),
    ('Notifications', 'notifications', 'In-app and email notifications'),
    ('Payments', 'payments', 'Invoices and payment tracking'),
    ('Reports', 'reports', 'Operational reports'),
    ('Lab', 'lab', 'Laboratory management'),
    ('Production', 'production', 'Production planning'),
    ('Pharmacy', 'pharmacy', 'Pharmacy management'),
    ('Audit Log', 'audit_log', 'Organization audit trail');

INSERT INTO module_plans (module_id, name, price, billing_cycle, features, max_users)
SELECT m.id, m.name || ' Monthly', 19, 'monthly', '[]', 10
FROM modules m
WHERE m.module_type IN ('lab', 'production', 'pharmacy');

INSERT INTO module_plans (module_id, name, price, billing_cycle, features, max_users)
SELECT m.id, m.name || ' Yearly', 190, 'yearly', '[]', 10
FROM modules m
WHERE m.module_type IN ('lab', 'production', 'pharmacy');

-- Default plan contents follow the stacked tier order
INSERT INTO plan_modules (plan_id, module_id)
SELECT p.id, m.id
FROM plans p
JOIN modules m ON
    m.module_type IN ('dashboard', 'onboarding')
    OR (p.tier IN ('seed', 'grow', 'pro', 'enterprise') AND m.module_type IN ('support', 'notifications'))
    OR (p.tier IN ('grow', 'pro', 'enterprise') AND m.module_type IN ('payments', 'reports'))
    OR (p.tier IN ('pro', 'enterprise') AND m.module_type IN ('lab', 'production'))
    OR (p.tier = 'enterprise' AND m.module_type IN ('pharmacy', 'audit_log'));
"#;

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_plan_history_append_only ON plan_history;
DROP FUNCTION IF EXISTS reject_plan_history_mutation();

DROP TABLE IF EXISTS plan_history CASCADE;
DROP TABLE IF EXISTS organization_modules CASCADE;
DROP TABLE IF EXISTS organizations CASCADE;
DROP TABLE IF EXISTS plan_modules CASCADE;
DROP TABLE IF EXISTS module_plans CASCADE;
DROP TABLE IF EXISTS modules CASCADE;
DROP TABLE IF EXISTS plans CASCADE;

DROP FUNCTION IF EXISTS set_updated_at();

DROP TYPE IF EXISTS billing_cycle CASCADE;
DROP TYPE IF EXISTS plan_history_kind CASCADE;
DROP TYPE IF EXISTS grant_status CASCADE;
DROP TYPE IF EXISTS plan_tier CASCADE;
DROP TYPE IF EXISTS organization_status CASCADE;
";
