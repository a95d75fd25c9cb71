use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AppError, FieldErrors};
use crate::model::employee::Employee;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s\-+()]+$").expect("valid phone regex"));
static SSN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}-\d{2}-\d{4}$").expect("valid ssn regex"));
static ROUTING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{9}$").expect("valid routing regex"));

pub const MAX_TAX_EXEMPTIONS: u32 = 10;

/// Collects one message per failing field.
#[derive(Debug, Default)]
struct Checker {
    errors: FieldErrors,
}

impl Checker {
    fn check(&mut self, field: &str, ok: bool, message: &str) {
        if !ok && !self.errors.contains_key(field) {
            self.errors.insert(field.to_string(), message.to_string());
        }
    }

    fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Validates an employee record as the employee form does.
pub fn validate_employee(e: &Employee) -> Result<(), AppError> {
    let mut c = Checker::default();

    // ---------- personal ----------
    let first = e.first_name.trim();
    c.check("first_name", !first.is_empty(), "First name is required");
    c.check("first_name", first.chars().count() <= 50, "First name is too long");

    let last = e.last_name.trim();
    c.check("last_name", !last.is_empty(), "Last name is required");
    c.check("last_name", last.chars().count() <= 50, "Last name is too long");

    c.check("email", is_email(&e.email), "Invalid email address");

    c.check(
        "phone",
        e.phone.chars().count() >= 10,
        "Phone number must be at least 10 digits",
    );
    c.check("phone", PHONE.is_match(&e.phone), "Invalid phone number format");

    c.check(
        "address.street",
        !e.address.street.trim().is_empty(),
        "Address is required",
    );

    c.check(
        "personal_info.ssn",
        SSN.is_match(&e.personal_info.ssn),
        "SSN must be in format XXX-XX-XXXX",
    );

    let contact = &e.personal_info.emergency_contact;
    c.check(
        "personal_info.emergency_contact.name",
        !contact.name.trim().is_empty(),
        "Emergency contact name is required",
    );
    c.check(
        "personal_info.emergency_contact.relationship",
        !contact.relationship.trim().is_empty(),
        "Relationship is required",
    );
    c.check(
        "personal_info.emergency_contact.phone",
        contact.phone.chars().count() >= 10,
        "Emergency contact phone is required",
    );

    // ---------- employment ----------
    c.check("department", !e.department.trim().is_empty(), "Department is required");
    c.check("position", !e.position.trim().is_empty(), "Position is required");

    // ---------- payroll ----------
    c.check(
        "salary",
        e.salary.is_finite() && e.salary >= 0.0,
        "Salary must be a positive number",
    );
    if let Some(rate) = e.hourly_rate {
        c.check(
            "hourly_rate",
            rate.is_finite() && rate >= 0.0,
            "Hourly rate must be a positive number",
        );
    }

    let deposit = &e.payroll_info.direct_deposit;
    c.check(
        "payroll_info.direct_deposit.bank_name",
        !deposit.bank_name.trim().is_empty(),
        "Bank name is required",
    );
    c.check(
        "payroll_info.direct_deposit.account_number",
        deposit.account_number.chars().count() >= 8,
        "Account number must be at least 8 digits",
    );
    c.check(
        "payroll_info.direct_deposit.routing_number",
        ROUTING.is_match(&deposit.routing_number),
        "Routing number must be 9 digits",
    );
    c.check(
        "payroll_info.tax_exemptions",
        e.payroll_info.tax_exemptions <= MAX_TAX_EXEMPTIONS,
        "Tax exemptions must be between 0 and 10",
    );

    c.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixtures;

    fn john() -> Employee {
        Fixtures::load("x").unwrap().employees.remove(0)
    }

    fn field_errors(result: Result<(), AppError>) -> FieldErrors {
        match result {
            Err(AppError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn seeded_employees_are_valid() {
        for employee in Fixtures::load("x").unwrap().employees {
            assert!(validate_employee(&employee).is_ok(), "employee {}", employee.id);
        }
    }

    #[test]
    fn reports_every_failing_field() {
        let mut e = john();
        e.first_name = "".into();
        e.email = "not-an-email".into();
        e.phone = "555-12".into();
        e.personal_info.ssn = "123456789".into();
        e.payroll_info.direct_deposit.routing_number = "12345".into();
        e.payroll_info.tax_exemptions = 11;
        e.salary = -1.0;

        let errors = field_errors(validate_employee(&e));
        assert_eq!(errors["first_name"], "First name is required");
        assert_eq!(errors["email"], "Invalid email address");
        assert_eq!(errors["phone"], "Phone number must be at least 10 digits");
        assert_eq!(errors["personal_info.ssn"], "SSN must be in format XXX-XX-XXXX");
        assert_eq!(
            errors["payroll_info.direct_deposit.routing_number"],
            "Routing number must be 9 digits"
        );
        assert_eq!(
            errors["payroll_info.tax_exemptions"],
            "Tax exemptions must be between 0 and 10"
        );
        assert_eq!(errors["salary"], "Salary must be a positive number");
        assert_eq!(errors.len(), 7);
    }

    #[test]
    fn phone_format_is_checked_after_length() {
        let mut e = john();
        e.phone = "call me maybe".into();

        let errors = field_errors(validate_employee(&e));
        assert_eq!(errors["phone"], "Invalid phone number format");
    }

    #[test]
    fn long_names_are_rejected() {
        let mut e = john();
        e.last_name = "x".repeat(51);

        let errors = field_errors(validate_employee(&e));
        assert_eq!(errors["last_name"], "Last name is too long");
    }
}
