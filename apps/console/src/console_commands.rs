use gatehouse_core::{AppError, AppResult};
use gatehouse_domain::{AccessFlag, RecordId};

use crate::console_views::{ViewRoute, parse_flag, parse_switch};

pub const HELP: &str = "\
session:      login | logout | whoami | quit
navigation:   view <home|roles|permissions|users|employees|customers> | show
rows:         list [keyword] | add | edit <id> | set <field> <value> | save | cancel | delete <id>
links:        expand <id> | collapse | link <email> | unlink <user-id> | toggle <user-id> <performance|finance> <on|off>
roles:        assign <user-id> <role>
permissions:  select <role> | role-add <name> [description] | role-delete | grant <resource> <action> | revoke <resource> <action>
users:        provision <email> <password> | sync";

/// One parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Login,
    Logout,
    WhoAmI,
    View(ViewRoute),
    Show,
    List(Option<String>),
    Add,
    Edit(RecordId),
    Set { field: String, value: String },
    Save,
    Cancel,
    Delete(RecordId),
    Expand(RecordId),
    Collapse,
    Link(String),
    Unlink(RecordId),
    Toggle {
        child: RecordId,
        flag: AccessFlag,
        enabled: bool,
    },
    Assign { user: RecordId, role: String },
    Select(String),
    CreateRole { name: String, description: String },
    DeleteRole,
    Grant { resource: String, action: String },
    Revoke { resource: String, action: String },
    Provision { email: String, password: String },
    Sync,
}

impl Command {
    /// Parses one input line; blank lines yield `None`.
    pub fn parse(line: &str) -> AppResult<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (name, args.as_slice()) {
            ("help" | "?", []) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            ("login", []) => Self::Login,
            ("logout", []) => Self::Logout,
            ("whoami", []) => Self::WhoAmI,
            ("view", [route]) => Self::View(ViewRoute::parse(route)?),
            ("show", []) => Self::Show,
            ("list", []) => Self::List(None),
            ("list", keyword) => Self::List(Some(keyword.join(" "))),
            ("add", []) => Self::Add,
            ("edit", [id]) => Self::Edit(RecordId::parse(id)),
            ("set", [field, value @ ..]) if !value.is_empty() => Self::Set {
                field: (*field).to_owned(),
                value: value.join(" "),
            },
            ("save", []) => Self::Save,
            ("cancel", []) => Self::Cancel,
            ("delete", [id]) => Self::Delete(RecordId::parse(id)),
            ("expand", [id]) => Self::Expand(RecordId::parse(id)),
            ("collapse", []) => Self::Collapse,
            ("link", [email]) => Self::Link((*email).to_owned()),
            ("unlink", [id]) => Self::Unlink(RecordId::parse(id)),
            ("toggle", [id, flag, value]) => Self::Toggle {
                child: RecordId::parse(id),
                flag: parse_flag(flag)?,
                enabled: parse_switch(value)?,
            },
            ("assign", [user, role]) => Self::Assign {
                user: RecordId::parse(user),
                role: (*role).to_owned(),
            },
            ("select", [role]) => Self::Select((*role).to_owned()),
            ("role-add", [name, description @ ..]) => Self::CreateRole {
                name: (*name).to_owned(),
                description: description.join(" "),
            },
            ("role-delete", []) => Self::DeleteRole,
            ("grant", [resource, action]) => Self::Grant {
                resource: (*resource).to_owned(),
                action: (*action).to_owned(),
            },
            ("revoke", [resource, action]) => Self::Revoke {
                resource: (*resource).to_owned(),
                action: (*action).to_owned(),
            },
            ("provision", [email, password]) => Self::Provision {
                email: (*email).to_owned(),
                password: (*password).to_owned(),
            },
            ("sync", []) => Self::Sync,
            _ => {
                return Err(AppError::Validation(format!(
                    "unrecognized command '{}'; type help",
                    line.trim()
                )));
            }
        };

        Ok(Some(command))
    }

    /// Returns true for commands that change backend data.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Save
                | Self::Delete(_)
                | Self::Link(_)
                | Self::Unlink(_)
                | Self::Toggle { .. }
                | Self::Assign { .. }
                | Self::CreateRole { .. }
                | Self::DeleteRole
                | Self::Grant { .. }
                | Self::Revoke { .. }
                | Self::Provision { .. }
                | Self::Sync
        )
    }
}
