use std::cmp::Ordering;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::model::employee::{Employee, EmployeeStatus, EmploymentType, NewEmployee};
use crate::store::AppStore;
use crate::utils::json_patch::merge_patch;
use crate::validation::validate_employee;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeSort {
    #[default]
    Id,
    Name,
    HireDate,
    Salary,
    Department,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Criteria for the employee directory; every set field must match.
#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    /// Case-insensitive match on name, email or position.
    pub search: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub department: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub manager_id: Option<u64>,
    pub hired_from: Option<NaiveDate>,
    pub hired_to: Option<NaiveDate>,
    pub sort_by: EmployeeSort,
    pub sort_order: SortOrder,
}

impl EmployeeFilter {
    fn matches(&self, e: &Employee) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let hit = e.full_name().to_lowercase().contains(&needle)
                || e.email.to_lowercase().contains(&needle)
                || e.position.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        self.status.is_none_or(|s| e.status == s)
            && self
                .department
                .as_deref()
                .is_none_or(|d| e.department.eq_ignore_ascii_case(d))
            && self.employment_type.is_none_or(|t| e.employment_type == t)
            && self.manager_id.is_none_or(|m| e.manager_id == Some(m))
            && self.hired_from.is_none_or(|from| e.hire_date >= from)
            && self.hired_to.is_none_or(|to| e.hire_date <= to)
    }

    fn compare(&self, a: &Employee, b: &Employee) -> Ordering {
        let ord = match self.sort_by {
            EmployeeSort::Id => a.id.cmp(&b.id),
            EmployeeSort::Name => (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name)),
            EmployeeSort::HireDate => a.hire_date.cmp(&b.hire_date),
            EmployeeSort::Salary => a.salary.total_cmp(&b.salary),
            EmployeeSort::Department => a.department.cmp(&b.department),
        }
        .then(a.id.cmp(&b.id));

        match self.sort_order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

impl AppStore {
    pub fn employee(&self, id: u64) -> Result<Employee, AppError> {
        self.employees.get(id)
    }

    pub fn employees_by_department(&self, department: &str) -> Vec<Employee> {
        self.employees.filter(|e| e.department == department)
    }

    pub fn active_employees(&self) -> Vec<Employee> {
        self.employees.filter(Employee::is_active)
    }

    pub fn employees_by_manager(&self, manager_id: u64) -> Vec<Employee> {
        self.employees.filter(|e| e.manager_id == Some(manager_id))
    }

    pub fn search_employees(&self, filter: &EmployeeFilter) -> Vec<Employee> {
        let mut found = self.employees.filter(|e| filter.matches(e));
        found.sort_by(|a, b| filter.compare(a, b));
        debug!(count = found.len(), "Employees matched filter");
        found
    }

    pub fn add_employee(&self, payload: NewEmployee) -> Result<Employee, AppError> {
        let candidate = payload.into_employee(Utc::now());
        validate_employee(&candidate)?;
        self.ensure_email_free(&candidate.email, None)?;

        let employee = self.employees.insert(candidate);
        info!(employee_id = employee.id, "Employee created");
        Ok(employee)
    }

    /// Applies a partial JSON update and re-validates the merged record.
    pub fn update_employee(&self, id: u64, patch: &Value) -> Result<Employee, AppError> {
        let current = self.employee(id)?;
        let merged: Employee = merge_patch(&current, patch, &[])?;
        validate_employee(&merged)?;
        if !merged.email.eq_ignore_ascii_case(&current.email) {
            self.ensure_email_free(&merged.email, Some(id))?;
        }

        let employee = self.employees.update(id, |row| {
            *row = merged;
            Ok(())
        })?;
        info!(employee_id = id, "Employee updated");
        Ok(employee)
    }

    pub fn delete_employee(&self, id: u64) -> Result<Employee, AppError> {
        let removed = self
            .employees
            .remove(id)
            .ok_or_else(|| AppError::not_found("Employee"))?;
        info!(employee_id = id, "Employee deleted");
        Ok(removed)
    }

    fn ensure_email_free(&self, email: &str, except: Option<u64>) -> Result<(), AppError> {
        let taken = self
            .employees
            .find_by(|e| e.email.eq_ignore_ascii_case(email) && Some(e.id) != except)
            .is_some();

        if taken {
            return Err(AppError::Conflict(
                "An employee with this email already exists".into(),
            ));
        }
        Ok(())
    }
}
