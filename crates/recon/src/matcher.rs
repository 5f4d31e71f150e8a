//! Header resolution: decide which column plays which role.
//!
//! Every role has an ordered list of named rules. Each rule is a pure predicate
//! over a normalized header. Rules are tried in priority order, and each rule
//! scans all columns in their original order; the first hit wins and later
//! matches are ignored.

use serde::Serialize;

use crate::error::ReconError;
use crate::model::ReconColumns;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SystemQuantity,
    CountTarget,
    Product,
    Family,
    Agent,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::SystemQuantity,
        Role::CountTarget,
        Role::Product,
        Role::Family,
        Role::Agent,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::SystemQuantity => "system quantity",
            Self::CountTarget => "count target",
            Self::Product => "product code",
            Self::Family => "family",
            Self::Agent => "counting agent",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Self::SystemQuantity | Self::CountTarget)
    }

    pub fn rules(&self) -> &'static [MatcherRule] {
        match self {
            Self::SystemQuantity => SYSTEM_QUANTITY_RULES,
            Self::CountTarget => COUNT_TARGET_RULES,
            Self::Product => PRODUCT_RULES,
            Self::Family => FAMILY_RULES,
            Self::Agent => AGENT_RULES,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A named predicate over a normalized header.
#[derive(Debug)]
pub struct MatcherRule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

const QUANTITY: &str = "cantidad";
const TO_COUNT: &str = "contar";

/// Known concatenated spellings of "Cantidad a contar", including the
/// doubled-"a" typo seen in exports.
const COUNT_TARGET_SPELLINGS: &[&str] = &["cantidadacontar", "cantidadaacontar"];

const SYSTEM_QUANTITY_RULES: &[MatcherRule] = &[
    MatcherRule {
        name: "exact_cantidad",
        matches: |h| h == QUANTITY,
    },
    // "Cantidad a contar" also contains "cantidad"; keep it out of this role.
    MatcherRule {
        name: "contains_cantidad_not_contar",
        matches: |h| h.contains(QUANTITY) && !h.contains(TO_COUNT),
    },
];

const COUNT_TARGET_RULES: &[MatcherRule] = &[MatcherRule {
    name: "cantidad_a_contar",
    matches: |h| {
        COUNT_TARGET_SPELLINGS.iter().any(|s| *s == h)
            || (h.contains(QUANTITY) && h.contains(TO_COUNT))
    },
}];

const PRODUCT_RULES: &[MatcherRule] = &[MatcherRule {
    name: "cod_producto",
    matches: |h| h.contains("cod") && h.contains("producto"),
}];

const FAMILY_RULES: &[MatcherRule] = &[MatcherRule {
    name: "exact_familia",
    matches: |h| h == "familia",
}];

const AGENT_RULES: &[MatcherRule] = &[MatcherRule {
    name: "exact_contador",
    matches: |h| h == "contador",
}];

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Strip every whitespace character (interior too) and lower-case.
pub fn normalize_header(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolve a single role against the candidate headers.
/// Returns the original (un-normalized) name and the rule that matched.
pub fn resolve_role<'a>(role: Role, names: &'a [String]) -> Option<(&'a str, &'static str)> {
    let normalized: Vec<String> = names.iter().map(|n| normalize_header(n)).collect();
    role.rules().iter().find_map(|rule| {
        normalized
            .iter()
            .position(|h| (rule.matches)(h))
            .map(|idx| (names[idx].as_str(), rule.name))
    })
}

/// Every role resolved independently. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedRoles {
    pub system_quantity: Option<String>,
    pub count_target: Option<String>,
    pub product: Option<String>,
    pub family: Option<String>,
    pub agent: Option<String>,
}

impl ResolvedRoles {
    pub fn get(&self, role: Role) -> Option<&str> {
        match role {
            Role::SystemQuantity => self.system_quantity.as_deref(),
            Role::CountTarget => self.count_target.as_deref(),
            Role::Product => self.product.as_deref(),
            Role::Family => self.family.as_deref(),
            Role::Agent => self.agent.as_deref(),
        }
    }

    /// Required roles that did not resolve, in role order.
    pub fn missing_required(&self) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|r| r.is_required() && self.get(*r).is_none())
            .collect()
    }

    /// Turn the resolution into engine columns, or fail with every missing
    /// required role and the full list of available column names.
    pub fn require(&self, available: &[String]) -> Result<ReconColumns, ReconError> {
        match (&self.system_quantity, &self.count_target) {
            (Some(system), Some(count)) => Ok(ReconColumns {
                system_quantity: system.clone(),
                count_target: count.clone(),
                product: self.product.clone(),
                family: self.family.clone(),
                agent: self.agent.clone(),
            }),
            _ => Err(ReconError::UnresolvedRoles {
                missing: self.missing_required(),
                available: available.to_vec(),
            }),
        }
    }
}

pub fn resolve_roles(names: &[String]) -> ResolvedRoles {
    let mut resolved = ResolvedRoles::default();
    for role in Role::ALL {
        let hit = resolve_role(role, names);
        if let Some((name, rule)) = hit {
            log::debug!("role '{role}' -> column \"{name}\" (rule {rule})");
        } else {
            log::debug!("role '{role}' unresolved");
        }
        let slot = match role {
            Role::SystemQuantity => &mut resolved.system_quantity,
            Role::CountTarget => &mut resolved.count_target,
            Role::Product => &mut resolved.product,
            Role::Family => &mut resolved.family,
            Role::Agent => &mut resolved.agent,
        };
        *slot = hit.map(|(name, _)| name.to_string());
    }
    resolved
}
