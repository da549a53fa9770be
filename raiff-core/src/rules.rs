//! Description-based classification rules.
//!
//! The bank's vocabulary lives in a small table of named predicates instead of
//! inline string checks, so another bank format only needs a different
//! `RuleSet`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic category a transaction description can fall into
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    #[serde(rename = "salary")]
    Salary,
    #[serde(rename = "meal-allowance")]
    MealAllowance,
    #[serde(rename = "cash-withdrawal")]
    CashWithdrawal,
    #[serde(rename = "currency-exchange")]
    CurrencyExchange,
}

impl Category {
    /// Title used for itemized operations of this category
    pub fn title(&self) -> &'static str {
        match self {
            Category::Salary => "Salary",
            Category::MealAllowance => "Meal allowance",
            Category::CashWithdrawal => "Cash withdraw",
            Category::CurrencyExchange => "Currency operation",
        }
    }
}

/// How a rule matches a description. Matching is case-sensitive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    Prefix(String),
    Contains(String),
    Regex(String),
}

/// Serializable form of a rule, as written in the config file:
///
/// ```toml
/// [[rules]]
/// category = "salary"
/// matcher = { prefix = "ZARADA" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleSpec {
    pub category: Category,
    pub matcher: Matcher,
}

impl RuleSpec {
    pub fn prefix(category: Category, pattern: &str) -> Self {
        Self { category, matcher: Matcher::Prefix(pattern.to_string()) }
    }

    pub fn contains(category: Category, pattern: &str) -> Self {
        Self { category, matcher: Matcher::Contains(pattern.to_string()) }
    }
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid regex for {category:?} rule: {source}")]
    Regex {
        category: Category,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone)]
enum Predicate {
    Prefix(String),
    Contains(String),
    Regex(Regex),
}

impl Predicate {
    fn is_match(&self, description: &str) -> bool {
        match self {
            Predicate::Prefix(p) => description.starts_with(p.as_str()),
            Predicate::Contains(p) => description.contains(p.as_str()),
            Predicate::Regex(re) => re.is_match(description),
        }
    }
}

#[derive(Debug, Clone)]
struct Rule {
    category: Category,
    predicate: Predicate,
}

/// Compiled, ordered rule table.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn compile(specs: &[RuleSpec]) -> Result<Self, RuleError> {
        let rules = specs
            .iter()
            .map(|spec| {
                let predicate = match &spec.matcher {
                    Matcher::Prefix(p) => Predicate::Prefix(p.clone()),
                    Matcher::Contains(p) => Predicate::Contains(p.clone()),
                    Matcher::Regex(p) => Predicate::Regex(Regex::new(p).map_err(|source| {
                        RuleError::Regex { category: spec.category, source }
                    })?),
                };
                Ok(Rule { category: spec.category, predicate })
            })
            .collect::<Result<Vec<_>, RuleError>>()?;
        Ok(Self { rules })
    }

    /// Raiffeisen Serbia vocabulary.
    pub fn raiffeisen_specs() -> Vec<RuleSpec> {
        vec![
            RuleSpec::prefix(Category::Salary, "ZARADA"),
            RuleSpec::prefix(Category::MealAllowance, "Prevoz"),
            RuleSpec::contains(Category::CashWithdrawal, " ATM "),
            RuleSpec::prefix(Category::CurrencyExchange, "EB "),
        ]
    }

    pub fn raiffeisen() -> Self {
        // literal matchers only, compilation cannot fail
        Self::compile(&Self::raiffeisen_specs()).unwrap_or(Self { rules: Vec::new() })
    }

    /// True if any rule of `category` matches the description.
    pub fn matches(&self, category: Category, description: &str) -> bool {
        self.rules
            .iter()
            .any(|r| r.category == category && r.predicate.is_match(description))
    }

    /// Category of the first matching rule, in declaration order.
    pub fn classify(&self, description: &str) -> Option<Category> {
        self.rules
            .iter()
            .find(|r| r.predicate.is_match(description))
            .map(|r| r.category)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::raiffeisen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_salary_and_meal_allowance() {
        let rules = RuleSet::raiffeisen();
        assert_eq!(rules.classify("ZARADA ZA MART 2023"), Some(Category::Salary));
        assert_eq!(rules.classify("Prevoz i topli obrok"), Some(Category::MealAllowance));
        // prefix, not substring
        assert_eq!(rules.classify("UPLATA ZARADA"), None);
    }

    #[test]
    fn test_atm_is_substring_match() {
        let rules = RuleSet::raiffeisen();
        assert!(rules.matches(Category::CashWithdrawal, "RBA ATM BEOGRAD"));
        assert!(!rules.matches(Category::CashWithdrawal, "ATM BEOGRAD"));
    }

    #[test]
    fn test_currency_exchange_prefix() {
        let rules = RuleSet::raiffeisen();
        assert!(rules.matches(Category::CurrencyExchange, "EB Kupovina deviza"));
        assert!(!rules.matches(Category::CurrencyExchange, "WEB SHOP"));
    }

    #[test]
    fn test_compile_regex_rule() {
        let specs = vec![RuleSpec {
            category: Category::Salary,
            matcher: Matcher::Regex(r"^(ZARADA|PLATA)\b".to_string()),
        }];
        let rules = RuleSet::compile(&specs).unwrap();
        assert_eq!(rules.classify("PLATA 03/2023"), Some(Category::Salary));
        assert_eq!(rules.classify("Prevoz"), None);
    }

    #[test]
    fn test_compile_rejects_bad_regex() {
        let specs = vec![RuleSpec {
            category: Category::CashWithdrawal,
            matcher: Matcher::Regex("(".to_string()),
        }];
        assert!(matches!(
            RuleSet::compile(&specs),
            Err(RuleError::Regex { category: Category::CashWithdrawal, .. })
        ));
    }

    #[test]
    fn test_rule_spec_from_toml() {
        #[derive(Deserialize)]
        struct Doc {
            rules: Vec<RuleSpec>,
        }
        let doc: Doc = toml::from_str(
            r#"
[[rules]]
category = "salary"
matcher = { prefix = "ZARADA" }

[[rules]]
category = "cash-withdrawal"
matcher = { contains = " ATM " }
"#,
        )
        .unwrap();
        assert_eq!(doc.rules[0], RuleSpec::prefix(Category::Salary, "ZARADA"));
        assert_eq!(doc.rules[1], RuleSpec::contains(Category::CashWithdrawal, " ATM "));
    }
}
