//! Canonical field catalog.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical semantic field identities.
///
/// The set is fixed; configuration can only change how each field is
/// recognized (aliases) and which primitive type it is declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldKind {
    /// Date of birth.
    #[serde(rename = "DOB")]
    Dob,
    /// Phone number(s), `|`-separated.
    Phone,
    /// PAN identifier (10 characters, unique per person).
    #[serde(rename = "pan")]
    Pan,
    /// Date of death.
    #[serde(rename = "DOD")]
    Dod,
    /// Postal address.
    Address,
    /// Email address(es), `|`-separated.
    Email,
    /// Person name.
    Name,
    /// Social security number.
    #[serde(rename = "SSN")]
    Ssn,
    /// Account number.
    AccountNumber,
    /// Gender.
    Gender,
    /// Zip/postal code.
    ZipCode,
    /// City.
    City,
    /// Age in years.
    Age,
}

impl FieldKind {
    /// All fields in default catalog order.
    pub const ALL: [FieldKind; 13] = [
        FieldKind::Dob,
        FieldKind::Phone,
        FieldKind::Pan,
        FieldKind::Dod,
        FieldKind::Address,
        FieldKind::Email,
        FieldKind::Name,
        FieldKind::Ssn,
        FieldKind::AccountNumber,
        FieldKind::Gender,
        FieldKind::ZipCode,
        FieldKind::City,
        FieldKind::Age,
    ];

    /// Canonical name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Dob => "DOB",
            FieldKind::Phone => "Phone",
            FieldKind::Pan => "pan",
            FieldKind::Dod => "DOD",
            FieldKind::Address => "Address",
            FieldKind::Email => "Email",
            FieldKind::Name => "Name",
            FieldKind::Ssn => "SSN",
            FieldKind::AccountNumber => "AccountNumber",
            FieldKind::Gender => "Gender",
            FieldKind::ZipCode => "ZipCode",
            FieldKind::City => "City",
            FieldKind::Age => "Age",
        }
    }

    /// Look up a field by canonical name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Primitive type a field is declared to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    /// Calendar date.
    Date,
    /// Number or `|`-separated list of numbers.
    Numeric,
    /// Non-blank text.
    Text,
    /// Email address or `|`-separated list of addresses.
    Email,
}

impl DeclaredType {
    /// Lowercase label.
    pub fn label(&self) -> &'static str {
        match self {
            DeclaredType::Date => "date",
            DeclaredType::Numeric => "numeric",
            DeclaredType::Text => "text",
            DeclaredType::Email => "email",
        }
    }
}

/// A canonical field with its header aliases and declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalField {
    /// Field identity.
    pub kind: FieldKind,
    /// Header strings accepted for this field.
    pub aliases: Vec<String>,
    /// Declared primitive type, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<DeclaredType>,
}

impl CanonicalField {
    /// Create a field definition.
    pub fn new(kind: FieldKind, aliases: &[&str], declared_type: Option<DeclaredType>) -> Self {
        Self {
            kind,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            declared_type,
        }
    }
}

/// Ordered catalog of canonical fields.
///
/// Order matters: the first-match strategy evaluates fields in this order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldCatalog {
    fields: Vec<CanonicalField>,
}

impl FieldCatalog {
    /// Create a catalog from field definitions.
    pub fn new(fields: Vec<CanonicalField>) -> Self {
        Self { fields }
    }

    /// Iterate fields in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &CanonicalField> {
        self.fields.iter()
    }

    /// Look up a field definition.
    pub fn get(&self, kind: FieldKind) -> Option<&CanonicalField> {
        self.fields.iter().find(|f| f.kind == kind)
    }

    /// Declared type of a field, if any.
    pub fn declared_type(&self, kind: FieldKind) -> Option<DeclaredType> {
        self.get(kind).and_then(|f| f.declared_type)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the catalog has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check that each field appears once and has at least one alias.
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.kind == field.kind) {
                return Err(format!("field '{}' is defined more than once", field.kind));
            }
            if field.aliases.iter().all(|a| a.trim().is_empty()) {
                return Err(format!("field '{}' has no aliases", field.kind));
            }
        }
        Ok(())
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        use DeclaredType::*;
        use FieldKind::*;

        Self::new(vec![
            CanonicalField::new(Dob, &["Date of Birth", "Birth Date", "DOB"], Some(Date)),
            CanonicalField::new(Phone, &["Phone", "Phone Number", "Mobile", "Contact"], Some(Numeric)),
            CanonicalField::new(Pan, &["PAN", "Pan Card", "pan", "PAN Number"], Some(Text)),
            CanonicalField::new(Dod, &["Date of Death", "DOD", "Death Date"], Some(Date)),
            CanonicalField::new(
                Address,
                &["Address", "Location", "Residence", "Home Address"],
                Some(Text),
            ),
            CanonicalField::new(FieldKind::Email, &["Email", "Email Address", "E-mail"], Some(DeclaredType::Email)),
            CanonicalField::new(
                Name,
                &["Name", "Full Name", "Person Name", "Customer Name"],
                Some(Text),
            ),
            CanonicalField::new(
                Ssn,
                &["SSN", "Social Security Number", "Social Sec No"],
                Some(Numeric),
            ),
            CanonicalField::new(AccountNumber, &["Account Number", "Acct No", "Account ID"], Some(Text)),
            CanonicalField::new(Gender, &["Gender", "Sex", "M/F"], Some(Text)),
            CanonicalField::new(ZipCode, &["Zip Code", "Postal Code", "Zip"], Some(Numeric)),
            CanonicalField::new(City, &["City", "Town", "Municipality"], Some(Text)),
            CanonicalField::new(Age, &["Age", "Age in Years", "Patient Age"], Some(Numeric)),
        ])
    }
}
