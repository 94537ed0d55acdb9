use gatehouse_core::{AppError, AppResult};
use gatehouse_domain::{
    Customer, CustomerUserLink, Employee, EmployeeUserLink, SubjectRoleAssignment, TableRecord,
    UserAccount,
};

/// Row type the console can print and edit field by field.
pub trait ConsoleRecord: TableRecord {
    /// One tab-separated output line.
    fn render(&self) -> String;

    /// Applies `set <field> <value>` to a row under edit.
    fn set_field(&mut self, field: &str, value: &str) -> AppResult<()>;
}

fn unknown_field(field: &str, editable: &[&str]) -> AppError {
    if editable.is_empty() {
        return AppError::Validation("this table has no editable fields".to_owned());
    }
    AppError::Validation(format!(
        "unknown field '{field}'; editable: {}",
        editable.join(", ")
    ))
}

impl ConsoleRecord for Employee {
    fn render(&self) -> String {
        format!("{}\t{}", self.id, self.full_name)
    }

    fn set_field(&mut self, field: &str, value: &str) -> AppResult<()> {
        match field {
            "full_name" | "name" => {
                self.full_name = value.to_owned();
                Ok(())
            }
            _ => Err(unknown_field(field, &["full_name"])),
        }
    }
}

impl ConsoleRecord for Customer {
    fn render(&self) -> String {
        format!("{}\t{}", self.id, self.full_name)
    }

    fn set_field(&mut self, field: &str, value: &str) -> AppResult<()> {
        match field {
            "full_name" | "name" => {
                self.full_name = value.to_owned();
                Ok(())
            }
            _ => Err(unknown_field(field, &["full_name"])),
        }
    }
}

impl ConsoleRecord for UserAccount {
    fn render(&self) -> String {
        format!("{}\t{}", self.id, self.email)
    }

    fn set_field(&mut self, field: &str, _value: &str) -> AppResult<()> {
        Err(unknown_field(field, &[]))
    }
}

impl ConsoleRecord for SubjectRoleAssignment {
    fn render(&self) -> String {
        let role = if self.role.is_empty() {
            "(none)"
        } else {
            self.role.as_str()
        };
        format!("{}\t{}\t{}\t{role}", self.id, self.full_name, self.email)
    }

    fn set_field(&mut self, field: &str, value: &str) -> AppResult<()> {
        match field {
            "role" => {
                self.role = value.to_owned();
                Ok(())
            }
            _ => Err(unknown_field(field, &["role"])),
        }
    }
}

impl ConsoleRecord for EmployeeUserLink {
    fn render(&self) -> String {
        format!("{}\t{}", self.id, self.email)
    }

    fn set_field(&mut self, field: &str, value: &str) -> AppResult<()> {
        match field {
            "email" => {
                self.email = value.to_owned();
                Ok(())
            }
            _ => Err(unknown_field(field, &["email"])),
        }
    }
}

impl ConsoleRecord for CustomerUserLink {
    fn render(&self) -> String {
        format!(
            "{}\t{}\tperformance={}\tfinance={}",
            self.id, self.email, self.has_performance_access, self.has_financial_access
        )
    }

    fn set_field(&mut self, field: &str, value: &str) -> AppResult<()> {
        match field {
            "email" => {
                self.email = value.to_owned();
                Ok(())
            }
            _ => Err(unknown_field(field, &["email"])),
        }
    }
}
