use std::{fmt, fmt::Write as _, str::FromStr};

use crate::{Error, Result};

/// Complete identity information for an assembly.
///
/// Provides identification for assemblies including name, version, culture and
/// strong-name token. This serves as the primary identifier for assemblies in
/// reference binding and cross-assembly resolution.
///
/// # Equality Semantics
///
/// **Important**: The [`public_key_token`](Self::public_key_token) field is
/// **excluded** from equality comparison and hashing. This is an intentional
/// design decision that enables:
///
/// - Assemblies observed with and without a recoverable token to be considered
///   equal for dependency-resolution purposes
/// - Consistent [`HashMap`](std::collections::HashMap) behavior when the same
///   assembly is referenced with different key representations
///
/// Two `AssemblyIdentity` instances are equal if and only if their `name`,
/// `version`, and `culture` fields are equal. Strong-name token checks happen
/// explicitly in the reference binder, where mismatches are a resolution
/// failure rather than a distinct identity.
#[derive(Debug, Clone)]
pub struct AssemblyIdentity {
    /// Simple assembly name (e.g., "mscorlib", "System.Core").
    ///
    /// The primary identifier used for basic assembly lookup and display.
    pub name: String,

    /// Four-part version number for compatibility and binding.
    ///
    /// Used for version binding decisions, unification and side-by-side
    /// resolution scenarios.
    pub version: AssemblyVersion,

    /// Culture information for localized assemblies.
    ///
    /// Specifies the localization culture for satellite assemblies containing
    /// culture-specific resources. `None` indicates a culture-neutral assembly
    /// that contains the default/fallback resources and executable code.
    ///
    /// # Examples
    /// - `None` - Culture-neutral assembly (default)
    /// - `Some("en-US")` - US English localized assembly
    pub culture: Option<String>,

    /// Strong-name public key token.
    ///
    /// Eight bytes stored as a little-endian `u64`. `None` for weak
    /// (unsigned) assemblies. A reference carrying a token only binds to a
    /// candidate with the same token.
    pub public_key_token: Option<u64>,
}

impl PartialEq for AssemblyIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version && self.culture == other.culture
        // Note: public_key_token is excluded from equality comparison so that
        // the same assembly observed with and without a recoverable token maps
        // to one cache entry. Token mismatches are detected in the binder.
    }
}

impl Eq for AssemblyIdentity {}

impl std::hash::Hash for AssemblyIdentity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
        self.culture.hash(state);
        // Note: public_key_token is excluded, matching PartialEq.
    }
}

/// Four-part version numbering for assemblies.
///
/// Implements the standard assembly versioning scheme with four 16-bit
/// components, compared component-wise in order: major, minor, build,
/// revision. This ordering enables version precedence decisions during
/// unification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssemblyVersion {
    /// Major version component.
    ///
    /// Indicates significant changes that may break compatibility with previous versions.
    pub major: u16,

    /// Minor version component.
    ///
    /// Indicates feature additions that maintain backward compatibility.
    pub minor: u16,

    /// Build version component.
    ///
    /// Indicates bug fixes, performance improvements, and minor feature updates.
    pub build: u16,

    /// Revision version component.
    ///
    /// Indicates emergency fixes, security patches, and critical hotfixes.
    pub revision: u16,
}

impl AssemblyIdentity {
    /// Create a new assembly identity with the specified components.
    ///
    /// # Arguments
    ///
    /// * `name` - Simple assembly name for identification
    /// * `version` - Four-part version number
    /// * `culture` - Optional culture for localized assemblies
    /// * `public_key_token` - Optional strong-name token
    pub fn new(
        name: impl Into<String>,
        version: AssemblyVersion,
        culture: Option<String>,
        public_key_token: Option<u64>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            culture,
            public_key_token,
        }
    }

    /// Create a weak (unversioned, unsigned, culture-neutral) identity.
    ///
    /// Convenience constructor for the common test and in-memory compilation
    /// case where only a simple name is known.
    pub fn simple(name: impl Into<String>) -> Self {
        Self::new(name, AssemblyVersion::UNKNOWN, None, None)
    }

    /// Parse assembly identity from a display name string.
    ///
    /// Parses assembly display names in the standard format used by the
    /// runtime and development tools. Supports both simple names and
    /// fully-qualified names with version, culture, and public key token.
    ///
    /// # Format
    ///
    /// ```text
    /// AssemblyName[, Version=Major.Minor.Build.Revision][, Culture=culture][, PublicKeyToken=token]
    /// ```
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bindscope::semantics::identity::AssemblyIdentity;
    ///
    /// // Simple name only
    /// let simple = AssemblyIdentity::parse("MyLibrary")?;
    ///
    /// // Full specification
    /// let full = AssemblyIdentity::parse(
    ///     "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089"
    /// )?;
    /// assert!(full.is_strong_named());
    /// # Ok::<(), bindscope::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns an error if the display name cannot be parsed.
    pub fn parse(display_name: &str) -> Result<Self> {
        let mut version = AssemblyVersion::UNKNOWN;
        let mut culture = None;
        let mut public_key_token = None;

        let parts: Vec<&str> = display_name.split(',').map(str::trim).collect();

        if parts.is_empty() {
            return Err(invariant_error!("Empty assembly display name"));
        }

        let name = parts[0].to_string();
        if name.is_empty() {
            return Err(invariant_error!("Assembly name cannot be empty"));
        }

        // Process optional components
        for part in parts.iter().skip(1) {
            if let Some(value) = part.strip_prefix("Version=") {
                version = AssemblyVersion::parse(value)?;
            } else if let Some(value) = part.strip_prefix("Culture=") {
                if value != "neutral" {
                    culture = Some(value.to_string());
                }
            } else if let Some(value) = part.strip_prefix("PublicKeyToken=") {
                if value != "null" && !value.is_empty() {
                    public_key_token = Some(Self::parse_token(value)?);
                }
            }
        }

        Ok(Self {
            name,
            version,
            culture,
            public_key_token,
        })
    }

    /// Parse a 16-hex-character public key token into its `u64` form.
    ///
    /// Tokens are stored little-endian internally; the first byte of the hex
    /// string is the first byte of the `u64`.
    fn parse_token(value: &str) -> Result<u64> {
        if value.len() != 16 {
            return Err(invariant_error!(
                "PublicKeyToken must be exactly 8 bytes (16 hex characters), got '{}'",
                value
            ));
        }

        let mut bytes = [0u8; 8];
        for (i, chunk) in value.as_bytes().chunks_exact(2).enumerate() {
            let hex = std::str::from_utf8(chunk)
                .map_err(|_| invariant_error!("Invalid hex in PublicKeyToken '{}'", value))?;
            bytes[i] = u8::from_str_radix(hex, 16)
                .map_err(|_| invariant_error!("Invalid hex in PublicKeyToken '{}'", value))?;
        }
        Ok(u64::from_le_bytes(bytes))
    }

    /// Generate display name string for this assembly identity.
    ///
    /// Creates a display name that includes all available identity components,
    /// in the standard `Name, Version=..., Culture=..., PublicKeyToken=...`
    /// layout.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bindscope::semantics::identity::{AssemblyIdentity, AssemblyVersion};
    ///
    /// let identity = AssemblyIdentity::new(
    ///     "MyLibrary",
    ///     AssemblyVersion::new(1, 2, 3, 4),
    ///     Some("en-US".to_string()),
    ///     None,
    /// );
    ///
    /// assert_eq!(
    ///     identity.display_name(),
    ///     "MyLibrary, Version=1.2.3.4, Culture=en-US, PublicKeyToken=null"
    /// );
    /// ```
    #[must_use]
    pub fn display_name(&self) -> String {
        // Typical format: "Name, Version=x.x.x.x, Culture=neutral, PublicKeyToken=xxxxxxxxxxxxxxxx"
        let mut result = String::with_capacity(self.name.len() + 80);

        result.push_str(&self.name);

        let _ = write!(result, ", Version={}", self.version);

        let culture_str = self.culture.as_deref().unwrap_or("neutral");
        let _ = write!(result, ", Culture={}", culture_str);

        // Tokens are stored as u64 little-endian internally, but displayed as hex
        // bytes in their natural order (first byte of the u64 comes first in the
        // hex string). "b77a5c561934e089" therefore represents the bytes
        // [0xb7, 0x7a, 0x5c, 0x56, 0x19, 0x34, 0xe0, 0x89].
        result.push_str(", PublicKeyToken=");
        match self.public_key_token {
            Some(token) => {
                let bytes = token.to_le_bytes();
                let _ = write!(
                    result,
                    "{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
                    bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7]
                );
            }
            None => result.push_str("null"),
        }

        result
    }

    /// Get the simple assembly name without version or culture information.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        &self.name
    }

    /// Check if this assembly is strong-named.
    ///
    /// Strong-named assemblies carry a public key token; references to them
    /// bind by full identity with version unification, while weak references
    /// bind by simple name.
    #[must_use]
    pub fn is_strong_named(&self) -> bool {
        self.public_key_token.is_some()
    }

    /// Check if this assembly is culture-neutral.
    #[must_use]
    pub fn is_culture_neutral(&self) -> bool {
        self.culture.is_none()
    }

    /// Check if this assembly identity satisfies a dependency requirement.
    ///
    /// This method determines whether this assembly can be used to satisfy a
    /// reference to another assembly, per the binder's matching rules.
    ///
    /// # Matching Rules
    ///
    /// 1. **Name**: Must match case-insensitively
    /// 2. **Culture**: Must match exactly (None matches None, "en-US" matches "en-US")
    /// 3. **Key token**: A strong requirement only binds to a candidate with the same token
    /// 4. **Version**: Must be compatible per [`AssemblyVersion::is_compatible_with`];
    ///    weak requirements (unknown version) match any candidate version
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bindscope::semantics::identity::{AssemblyIdentity, AssemblyVersion};
    ///
    /// let available = AssemblyIdentity::new(
    ///     "System.Core",
    ///     AssemblyVersion::new(4, 5, 0, 0),
    ///     None,
    ///     None,
    /// );
    ///
    /// let required = AssemblyIdentity::new(
    ///     "System.Core",
    ///     AssemblyVersion::new(4, 0, 0, 0),
    ///     None,
    ///     None,
    /// );
    ///
    /// // v4.5 satisfies a requirement for v4.0
    /// assert!(available.satisfies(&required));
    ///
    /// // But v4.0 does NOT satisfy a requirement for v4.5
    /// assert!(!required.satisfies(&available));
    /// ```
    #[must_use]
    pub fn satisfies(&self, required: &AssemblyIdentity) -> bool {
        // Name must match (case-insensitive)
        if !self.name.eq_ignore_ascii_case(&required.name) {
            return false;
        }

        // Culture must match exactly
        if self.culture != required.culture {
            return false;
        }

        // A strong requirement only binds to the same key token
        if required.public_key_token.is_some() && self.public_key_token != required.public_key_token
        {
            return false;
        }

        // Weak requirements bind regardless of candidate version
        if required.version.is_unknown() {
            return true;
        }

        self.version.is_compatible_with(&required.version)
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for AssemblyIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AssemblyVersion {
    /// Sentinel value representing an unknown or unspecified version.
    ///
    /// This constant (0.0.0.0) is used when version information is not
    /// available, such as for in-memory compilations that never declared one.
    ///
    /// Use [`is_unknown()`](Self::is_unknown) to check if a version represents this sentinel.
    pub const UNKNOWN: Self = Self {
        major: 0,
        minor: 0,
        build: 0,
        revision: 0,
    };

    /// Create a new assembly version with the specified components.
    #[must_use]
    pub fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parse a version string into an `AssemblyVersion`.
    ///
    /// Accepts one to four dot-separated components; missing components
    /// default to zero ("1.2" parses as 1.2.0.0).
    ///
    /// # Errors
    /// Returns an error if the string is empty, has more than four
    /// components, or contains a non-numeric component.
    pub fn parse(version: &str) -> Result<Self> {
        let parts: Vec<&str> = version.split('.').collect();

        if parts.is_empty() || parts.len() > 4 {
            return Err(invariant_error!("Invalid version string '{}'", version));
        }

        let mut components = [0u16; 4];
        for (i, part) in parts.iter().enumerate() {
            components[i] = part
                .parse::<u16>()
                .map_err(|_| invariant_error!("Invalid version component '{}' in '{}'", part, version))?;
        }

        Ok(Self::new(
            components[0],
            components[1],
            components[2],
            components[3],
        ))
    }

    /// Check if this version is the unknown sentinel (0.0.0.0).
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }

    /// Check whether this version can satisfy a requirement for `required`.
    ///
    /// A version is compatible when it is greater than or equal to the
    /// required version; the binder's unification policy records the
    /// substitution whenever the versions are not identical.
    #[must_use]
    pub fn is_compatible_with(&self, required: &AssemblyVersion) -> bool {
        self >= required
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assembly_version_new() {
        let version = AssemblyVersion::new(1, 2, 3, 4);
        assert_eq!(version.major, 1);
        assert_eq!(version.minor, 2);
        assert_eq!(version.build, 3);
        assert_eq!(version.revision, 4);
    }

    #[test]
    fn test_assembly_version_parse_full() {
        let version = AssemblyVersion::parse("4.0.0.0").unwrap();
        assert_eq!(version.major, 4);
        assert_eq!(version.minor, 0);
        assert_eq!(version.build, 0);
        assert_eq!(version.revision, 0);
    }

    #[test]
    fn test_assembly_version_parse_partial() {
        // Three parts
        let v3 = AssemblyVersion::parse("1.2.3").unwrap();
        assert_eq!(v3, AssemblyVersion::new(1, 2, 3, 0));

        // Two parts
        let v2 = AssemblyVersion::parse("1.2").unwrap();
        assert_eq!(v2, AssemblyVersion::new(1, 2, 0, 0));
    }

    #[test]
    fn test_assembly_version_parse_invalid() {
        assert!(AssemblyVersion::parse("1.2.3.4.5").is_err());
        assert!(AssemblyVersion::parse("1.x").is_err());
        assert!(AssemblyVersion::parse("").is_err());
    }

    #[test]
    fn test_assembly_version_ordering() {
        let v1 = AssemblyVersion::new(1, 0, 0, 0);
        let v2 = AssemblyVersion::new(1, 0, 0, 1);
        let v3 = AssemblyVersion::new(2, 0, 0, 0);
        assert!(v1 < v2);
        assert!(v2 < v3);
        assert!(v3.is_compatible_with(&v1));
        assert!(!v1.is_compatible_with(&v3));
    }

    #[test]
    fn test_identity_parse_simple() {
        let identity = AssemblyIdentity::parse("MyLibrary").unwrap();
        assert_eq!(identity.name, "MyLibrary");
        assert!(identity.version.is_unknown());
        assert!(identity.is_culture_neutral());
        assert!(!identity.is_strong_named());
    }

    #[test]
    fn test_identity_parse_full() {
        let identity = AssemblyIdentity::parse(
            "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
        )
        .unwrap();
        assert_eq!(identity.name, "mscorlib");
        assert_eq!(identity.version, AssemblyVersion::new(4, 0, 0, 0));
        assert!(identity.is_culture_neutral());
        assert!(identity.is_strong_named());
    }

    #[test]
    fn test_identity_display_round_trip() {
        let input = "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089";
        let identity = AssemblyIdentity::parse(input).unwrap();
        assert_eq!(identity.display_name(), input);
    }

    #[test]
    fn test_identity_equality_ignores_token() {
        let signed = AssemblyIdentity::parse(
            "Lib, Version=1.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
        )
        .unwrap();
        let unsigned = AssemblyIdentity::parse("Lib, Version=1.0.0.0").unwrap();
        assert_eq!(signed, unsigned);

        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut h1 = DefaultHasher::new();
        let mut h2 = DefaultHasher::new();
        signed.hash(&mut h1);
        unsigned.hash(&mut h2);
        assert_eq!(h1.finish(), h2.finish());
    }

    #[test]
    fn test_satisfies_culture_sensitive() {
        let neutral = AssemblyIdentity::simple("Res");
        let german = AssemblyIdentity::new(
            "Res",
            AssemblyVersion::UNKNOWN,
            Some("de-DE".to_string()),
            None,
        );
        assert!(!german.satisfies(&neutral));
        assert!(!neutral.satisfies(&german));
    }

    #[test]
    fn test_satisfies_strong_token() {
        let required = AssemblyIdentity::parse(
            "Lib, Version=1.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
        )
        .unwrap();
        let unsigned = AssemblyIdentity::parse("Lib, Version=2.0.0.0").unwrap();
        let signed = AssemblyIdentity::parse(
            "Lib, Version=2.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
        )
        .unwrap();
        assert!(!unsigned.satisfies(&required));
        assert!(signed.satisfies(&required));
    }
}
