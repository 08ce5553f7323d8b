// 🏷️ Catalog - the allowed registers, expense categories and payment methods
//
// Categories and methods are validated against this registry when records
// are created. The aggregator itself never consults it.

use crate::record::{Kind, PaymentMethod};
use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

// ============================================================================
// DEFAULTS
// ============================================================================

const DEFAULT_INCOME_CATEGORIES: [&str; 23] = [
    "INICIO DEL DIA",
    "CAJA MAYORISTA TM",
    "CAJA MAYORISTA TT",
    "CAJA MINORISTA TM",
    "CAJA MINORISTA TT",
    "CAJA COLON TM",
    "CAJA COLON TT",
    "CUENTA GALICIA JULITO",
    "CUENTA GALICIA ROCIO",
    "CUENTA MERCADO PAGO",
    "ANTICIPO DE CAJA MAYORISTA",
    "ANTICIPO DE CAJA MINORISTA",
    "ANTICIPO DE CAJA COLON",
    "COBRANZAS",
    "REPARTO",
    "TRANSFERENCIAS FINANCIERAS",
    "CHEQUES FINANCIEROS",
    "CHEQUES DE LEO FINANCISTA",
    "ELI PERSONAL",
    "DEPOSITO EN CUENTA",
    "SOBRANTES",
    "PRESTAMOS",
    "INGRESOS EXTRAS",
];

const DEFAULT_EXPENSE_CATEGORIES: [&str; 43] = [
    "CUENTA GALICIA JULITO",
    "CUENTA GALICIA ROCIO",
    "CUENTA MERCADO PAGO",
    "TRANSFERENCIAS FINANCIERAS",
    "CHEQUES FINANCIEROS",
    "CHEQUES DE LEO FINANCISTA",
    "SUELDOS FIJOS",
    "SUELDOS TEMPORALES",
    "LIMPIEZA",
    "BOLSAS",
    "DESAYUNO",
    "COMBUSTIBLE",
    "ROCIO PERSONAL",
    "JULITO PERSONAL",
    "LEO PERSONAL",
    "ELI PERSONAL",
    "CASA",
    "MARKETING",
    "SEGURIDAD",
    "ALMUERZO",
    "LIBRERIA",
    "HORAS EXTRA",
    "GASTOS EXTRA",
    "TAXI/UBER",
    "SUPER",
    "SERVICIOS",
    "PAGO TARJETA",
    "PAGO PROVEEDORES",
    "MUNICIPALES",
    "MANTENIMIENTO JURAMENTO",
    "MANTENIMIENTO COLON",
    "MANTENIMIENTO JUAN B JUSTO",
    "MANTENIMIENTO DE VEHICULOS",
    "ALQUILER",
    "IMPUESTOS",
    "COSTOS FINANCIEROS",
    "TARJETA",
    "PUERTOS DE FRIO",
    "LEO",
    "FINANCIERA",
    "DEPOSITO EN CUENTA",
    "HONORARIOS",
    "GASTOS EMPLEADOS",
];

const DEFAULT_INCOME_ALERT: i64 = 500_000_000;
const DEFAULT_EXPENSE_ALERT: i64 = 5_000_000;

// ============================================================================
// CATALOG
// ============================================================================

/// Catalog - allowed enumerations and alert thresholds, per movement kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Registers and accounts that receive money
    pub income_categories: Vec<String>,

    pub expense_categories: Vec<String>,

    pub income_methods: Vec<PaymentMethod>,

    pub expense_methods: Vec<PaymentMethod>,

    /// Per-register method restrictions (e.g. a till that takes no transfers).
    /// Keys must be income categories; expenses always use `expense_methods`.
    #[serde(default)]
    pub method_overrides: BTreeMap<String, Vec<PaymentMethod>>,

    /// Amounts above these need explicit confirmation
    pub income_alert_threshold: Decimal,
    pub expense_alert_threshold: Decimal,
}

impl Catalog {
    /// Catalog with the business's built-in lists
    pub fn with_defaults() -> Self {
        Catalog {
            income_categories: DEFAULT_INCOME_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            expense_categories: DEFAULT_EXPENSE_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            income_methods: PaymentMethod::ALL.to_vec(),
            expense_methods: vec![
                PaymentMethod::Cash,
                PaymentMethod::Transfer,
                PaymentMethod::Deposit,
                PaymentMethod::Check,
                PaymentMethod::ECheck,
            ],
            method_overrides: BTreeMap::new(),
            income_alert_threshold: Decimal::from(DEFAULT_INCOME_ALERT),
            expense_alert_threshold: Decimal::from(DEFAULT_EXPENSE_ALERT),
        }
    }

    /// Load a catalog from a JSON file, replacing the defaults entirely
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;

        let catalog = Self::from_json(&content)
            .with_context(|| format!("Invalid catalog file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            income_categories = catalog.income_categories.len(),
            expense_categories = catalog.expense_categories.len(),
            "loaded catalog"
        );

        Ok(catalog)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let catalog: Catalog =
            serde_json::from_str(content).context("Failed to parse catalog JSON")?;
        catalog.check()?;
        Ok(catalog)
    }

    fn check(&self) -> Result<()> {
        if self.income_categories.is_empty() || self.expense_categories.is_empty() {
            bail!("Catalog must list at least one income and one expense category");
        }
        if self.income_methods.is_empty() || self.expense_methods.is_empty() {
            bail!("Catalog must list at least one payment method per kind");
        }
        if self.income_alert_threshold <= Decimal::ZERO
            || self.expense_alert_threshold <= Decimal::ZERO
        {
            bail!("Alert thresholds must be positive");
        }
        for (category, methods) in &self.method_overrides {
            if !self.is_allowed_category(Kind::Income, category) {
                bail!("Method override for '{}' does not name an income category", category);
            }
            if methods.is_empty() {
                bail!("Method override for '{}' lists no payment methods", category);
            }
        }
        Ok(())
    }

    pub fn categories(&self, kind: Kind) -> &[String] {
        match kind {
            Kind::Income => &self.income_categories,
            Kind::Expense => &self.expense_categories,
        }
    }

    /// Canonical spelling of a category, matched case-insensitively
    pub fn find_category(&self, kind: Kind, name: &str) -> Option<&str> {
        let name = name.trim();
        self.categories(kind)
            .iter()
            .find(|c| c.eq_ignore_ascii_case(name))
            .map(|c| c.as_str())
    }

    pub fn is_allowed_category(&self, kind: Kind, name: &str) -> bool {
        self.find_category(kind, name).is_some()
    }

    /// Methods accepted for a category; overrides apply to income registers only
    pub fn allowed_methods(&self, kind: Kind, category: &str) -> &[PaymentMethod] {
        match kind {
            Kind::Income => self
                .method_overrides
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(category.trim()))
                .map(|(_, methods)| methods.as_slice())
                .unwrap_or(self.income_methods.as_slice()),
            Kind::Expense => self.expense_methods.as_slice(),
        }
    }

    pub fn is_allowed_method(&self, kind: Kind, category: &str, method: PaymentMethod) -> bool {
        self.allowed_methods(kind, category).contains(&method)
    }

    pub fn alert_threshold(&self, kind: Kind) -> Decimal {
        match kind {
            Kind::Income => self.income_alert_threshold,
            Kind::Expense => self.expense_alert_threshold,
        }
    }

    /// Strictly above the kind's threshold
    pub fn is_high_amount(&self, kind: Kind, amount: Decimal) -> bool {
        amount > self.alert_threshold(kind)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// TESTS
// ============================================================================
