//! Synthetic cohort generation
//!
//! This module builds the employee cohort that seeds a run: names,
//! departments, roles, hire dates, and the per-role account baselines drawn
//! from the enterprise-system catalog. All draws come from the caller's RNG
//! so a seeded run produces the same cohort.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::info;

use crate::employee::{AccountBinding, Employee, EmployeeRegistry};
use crate::types::{EmployeeId, GrantKind, Role, SimulationConfig};

/// Common surnames used for synthetic employee names
const SURNAMES: &[&str] = &[
    "张", "李", "王", "刘", "陈", "杨", "赵", "黄", "周", "吴", "徐", "孙", "马", "朱", "胡",
    "郭", "何", "林",
];

/// Common given names used for synthetic employee names
const GIVEN_NAMES: &[&str] = &[
    "伟", "娜", "芳", "强", "静", "洋", "敏", "磊", "杰", "秀英", "军", "丽", "涛", "艳", "勇",
    "娟", "飞", "霞",
];

/// Reasons offered when a resignation is submitted
pub const RESIGNATION_REASONS: &[&str] =
    &["个人发展", "家庭原因", "薪酬福利", "职业转型", "健康原因", "继续深造"];

/// Generates the synthetic employee cohort
#[derive(Debug)]
pub struct CohortGenerator<'a> {
    config: &'a SimulationConfig,
}

impl<'a> CohortGenerator<'a> {
    /// Create a generator over the given configuration
    pub fn new(config: &'a SimulationConfig) -> Self {
        Self { config }
    }

    /// Generate the full cohort as a populated registry
    ///
    /// Hire dates fall before `start` so onboarding journal entries and all
    /// generated activity come after the employee joined.
    pub fn generate<R: Rng>(&self, rng: &mut R, start: DateTime<Utc>) -> EmployeeRegistry {
        let mut registry = EmployeeRegistry::new();

        for n in 1..=self.config.employee_count {
            let hired = start - Duration::days(rng.gen_range(120..=2400))
                + Duration::minutes(rng.gen_range(0..120));
            registry.add_employee(self.generate_employee(EmployeeId::new(n as u32), hired, rng));
        }

        info!(
            employee_count = registry.employee_count(),
            "synthetic cohort generated"
        );
        registry
    }

    /// Generate a single employee hired at the given moment
    ///
    /// Also used for new hires registered mid-run, so onboarding records go
    /// through the same draw path as the initial cohort.
    pub fn generate_employee<R: Rng>(
        &self,
        id: EmployeeId,
        hired: DateTime<Utc>,
        rng: &mut R,
    ) -> Employee {
        let role = draw_role(rng);
        let bindings = self.baseline_bindings(role, hired, rng);
        Employee::new(
            id,
            draw_name(rng),
            department_for(role),
            draw_position(role, rng),
            role,
            hired,
            bindings,
        )
    }

    fn baseline_bindings<R: Rng>(
        &self,
        role: Role,
        provisioned_at: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<AccountBinding> {
        self.config
            .systems
            .baseline_systems(role)
            .into_iter()
            .map(|system| {
                let grant = grant_for(role, &system, rng);
                AccountBinding::new(system, grant, provisioned_at)
            })
            .collect()
    }
}

/// Draw a role with a plausible company distribution
fn draw_role<R: Rng>(rng: &mut R) -> Role {
    let roll: f64 = rng.gen();
    if roll < 0.03 {
        Role::Executive
    } else if roll < 0.13 {
        Role::Finance
    } else if roll < 0.48 {
        Role::Engineering
    } else if roll < 0.68 {
        Role::Sales
    } else if roll < 0.75 {
        Role::Hr
    } else {
        Role::General
    }
}

fn draw_name<R: Rng>(rng: &mut R) -> String {
    let surname = SURNAMES[rng.gen_range(0..SURNAMES.len())];
    let given = GIVEN_NAMES[rng.gen_range(0..GIVEN_NAMES.len())];
    format!("{}{}", surname, given)
}

/// Department of record for a role
pub fn department_for(role: Role) -> &'static str {
    match role {
        Role::Executive => "管理层",
        Role::Finance => "财务部",
        Role::Engineering => "技术部",
        Role::Sales => "销售部",
        Role::Hr => "人事部",
        Role::General => "运营部",
    }
}

fn draw_position<R: Rng>(role: Role, rng: &mut R) -> &'static str {
    let pool: &[&str] = match role {
        Role::Executive => &["总监", "副总裁", "部门总经理"],
        Role::Finance => &["会计", "财务分析师", "出纳"],
        Role::Engineering => &["软件工程师", "高级工程师", "运维工程师", "测试工程师"],
        Role::Sales => &["销售代表", "客户经理", "渠道经理"],
        Role::Hr => &["招聘专员", "人事主管", "薪酬专员"],
        Role::General => &["行政专员", "运营专员", "采购专员"],
    };
    pool[rng.gen_range(0..pool.len())]
}

/// Grant held on a system, biased by how central it is to the role
fn grant_for<R: Rng>(role: Role, system: &str, rng: &mut R) -> GrantKind {
    let core = matches!(
        (role, system),
        (Role::Engineering, "DevEnvironment" | "Database")
            | (Role::Finance, "FinanceLedger")
            | (Role::Executive, "FinanceLedger" | "CRM")
            | (Role::Sales, "CRM")
    );
    if core {
        if rng.gen_bool(0.3) {
            GrantKind::Admin
        } else {
            GrantKind::ReadWrite
        }
    } else if matches!(system, "Email" | "OfficeSuite") {
        GrantKind::ReadWrite
    } else {
        GrantKind::Read
    }
}
