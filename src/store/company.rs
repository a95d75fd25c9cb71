use serde_json::Value;
use tracing::info;

use crate::error::AppError;
use crate::model::company::{Company, Department, Position};
use crate::store::AppStore;
use crate::utils::json_patch::merge_patch;
use crate::validation::is_email;

/// The single company row.
const COMPANY_ID: u64 = 1;

impl AppStore {
    pub fn company(&self) -> Result<Company, AppError> {
        self.company.get(COMPANY_ID)
    }

    /// Settings page save: profile, payroll, tax and benefit sections.
    pub fn update_company(&self, patch: &Value) -> Result<Company, AppError> {
        let current = self.company()?;
        let merged: Company = merge_patch(&current, patch, &[])?;

        if merged.name.trim().is_empty() {
            return Err(AppError::BadRequest("Company name is required".into()));
        }
        if !is_email(&merged.contact.email) {
            return Err(AppError::BadRequest("Invalid email address".into()));
        }

        let s = &merged.payroll_settings;
        if s.overtime_threshold <= 0.0 || s.overtime_multiplier < 1.0 {
            return Err(AppError::BadRequest(
                "Overtime threshold must be positive and multiplier at least 1".into(),
            ));
        }
        if !(1..=7).contains(&s.pay_day) {
            return Err(AppError::BadRequest("pay_day must be between 1 and 7".into()));
        }

        let t = &merged.tax_settings;
        let rates = [
            t.federal_tax_rate,
            t.state_tax_rate,
            t.social_security_rate,
            t.medicare_rate,
            t.unemployment_rate,
            t.workers_comp_rate,
        ];
        if rates.iter().any(|r| !(0.0..=1.0).contains(r)) {
            return Err(AppError::BadRequest(
                "Tax rates must be fractions between 0 and 1".into(),
            ));
        }

        let company = self.company.update(COMPANY_ID, |row| {
            *row = merged;
            Ok(())
        })?;
        info!("Company settings updated");
        Ok(company)
    }

    pub fn department(&self, id: u64) -> Result<Department, AppError> {
        self.departments.get(id)
    }

    pub fn active_departments(&self) -> Vec<Department> {
        self.departments.filter(|d| d.is_active)
    }

    pub fn position(&self, id: u64) -> Result<Position, AppError> {
        self.positions.get(id)
    }

    pub fn active_positions(&self) -> Vec<Position> {
        self.positions.filter(|p| p.is_active)
    }

    pub fn positions_by_department(&self, department: &str) -> Vec<Position> {
        self.positions
            .filter(|p| p.department.eq_ignore_ascii_case(department))
    }
}
