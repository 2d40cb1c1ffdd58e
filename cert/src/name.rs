//! Distinguished names and the attribute types this crate reads and writes.

use crate::{
    Error, Result,
    asn1::{AttributeTypeAndValue, Name},
};
use der::{
    Tag, Tagged,
    asn1::{Any, Ia5StringRef, ObjectIdentifier, PrintableStringRef, SetOfVec},
};

/// `id-at-commonName`
pub const COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
/// `id-at-countryName`
pub const COUNTRY_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
/// `id-at-localityName`
pub const LOCALITY_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");
/// `id-at-stateOrProvinceName`
pub const STATE_OR_PROVINCE_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.8");
/// `id-at-organizationName`
pub const ORGANIZATION_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
/// `id-at-organizationalUnitName`
pub const ORGANIZATIONAL_UNIT_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.11");
/// `id-at-description`
pub const DESCRIPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.13");
/// PKCS#9 `emailAddress`
pub const EMAIL_ADDRESS: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.1");

/// Subject fields accepted when generating a request. Empty fields are
/// left out of the name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubjectFields {
    /// Two-letter country code (`C`).
    pub country: Option<String>,
    /// State or province (`ST`).
    pub province: Option<String>,
    /// Locality (`L`).
    pub locality: Option<String>,
    /// Organization (`O`).
    pub organization: Option<String>,
    /// Organizational unit (`OU`).
    pub organizational_unit: Option<String>,
    /// Common name (`CN`).
    pub common_name: Option<String>,
    /// PKCS#9 email address.
    pub email: Option<String>,
}

impl SubjectFields {
    /// Build the name in `C, ST, L, O, OU, CN, emailAddress` order.
    ///
    /// At least one field must be present.
    pub fn to_name(&self) -> Result<Name> {
        let fields = [
            (COUNTRY_NAME, &self.country),
            (STATE_OR_PROVINCE_NAME, &self.province),
            (LOCALITY_NAME, &self.locality),
            (ORGANIZATION_NAME, &self.organization),
            (ORGANIZATIONAL_UNIT_NAME, &self.organizational_unit),
            (COMMON_NAME, &self.common_name),
            (EMAIL_ADDRESS, &self.email),
        ];

        let mut name = Name::new();
        for (oid, value) in fields {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                push_attribute(&mut name, oid, value)?;
            }
        }

        if name.is_empty() {
            return Err(Error::InvalidParameter);
        }
        Ok(name)
    }
}

/// Append `oid = value` as a new single-valued RDN.
pub fn push_attribute(name: &mut Name, oid: ObjectIdentifier, value: &str) -> Result<()> {
    let value = directory_string(oid, value)?;
    let rdn = SetOfVec::try_from(vec![AttributeTypeAndValue { oid, value }])?;
    name.push(rdn);
    Ok(())
}

/// All values of attribute `oid`, in name order.
pub fn attribute_values(name: &Name, oid: ObjectIdentifier) -> Vec<String> {
    name.iter()
        .flat_map(|rdn| rdn.iter())
        .filter(|atv| atv.oid == oid)
        .filter_map(|atv| string_value(&atv.value))
        .collect()
}

/// Decode any of the directory string types as UTF-8.
pub(crate) fn string_value(value: &Any) -> Option<String> {
    match value.tag() {
        Tag::Utf8String | Tag::PrintableString | Tag::Ia5String | Tag::TeletexString => {
            core::str::from_utf8(value.value()).ok().map(str::to_owned)
        }
        _ => None,
    }
}

/// `countryName` is a `PrintableString` and `emailAddress` an `IA5String`;
/// everything else is written as `UTF8String`.
fn directory_string(oid: ObjectIdentifier, value: &str) -> Result<Any> {
    let tag = if oid == COUNTRY_NAME {
        PrintableStringRef::new(value)?;
        Tag::PrintableString
    } else if oid == EMAIL_ADDRESS {
        Ia5StringRef::new(value)?;
        Tag::Ia5String
    } else {
        Tag::Utf8String
    };
    Ok(Any::new(tag, value.as_bytes())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_order_and_types() {
        let fields = SubjectFields {
            country: Some("CN".into()),
            common_name: Some("alice".into()),
            email: Some("alice@example.com".into()),
            ..Default::default()
        };
        let name = fields.to_name().unwrap();
        assert_eq!(name.len(), 3);
        assert_eq!(name[0].iter().next().unwrap().value.tag(), Tag::PrintableString);
        assert_eq!(attribute_values(&name, COMMON_NAME), ["alice"]);
        assert_eq!(attribute_values(&name, EMAIL_ADDRESS), ["alice@example.com"]);
    }

    #[test]
    fn empty_subject_rejected() {
        let fields = SubjectFields {
            common_name: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(fields.to_name(), Err(Error::InvalidParameter)));
    }

    #[test]
    fn repeated_attributes_are_kept() {
        let mut name = Name::new();
        push_attribute(&mut name, DESCRIPTION, "first").unwrap();
        push_attribute(&mut name, DESCRIPTION, "second").unwrap();
        assert_eq!(attribute_values(&name, DESCRIPTION), ["first", "second"]);
    }

    #[test]
    fn non_printable_country_rejected() {
        let mut name = Name::new();
        assert!(push_attribute(&mut name, COUNTRY_NAME, "C@").is_err());
    }
}
