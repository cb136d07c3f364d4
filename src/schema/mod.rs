//! schema
//!
//! The declared configuration contract for the current release.
//!
//! # Overview
//!
//! The host renders configuration forms from a declarative field listing:
//! each field's type, nullability, numeric range, default, and (for the
//! backend selector) its legal variants. This module carries that listing
//! as data. Display prose beyond field labels belongs to the host's form
//! renderer, not here.
//!
//! Two consumers: the `schema` command serializes the whole declaration for
//! the host, and [`ConfigSpec::required_shape`] reduces it to the structural
//! shape a migrated document must satisfy to count as configured.

use indexmap::IndexMap;
use serde::Serialize;

use crate::core::shape::{Kind, Shape};

/// A named field in the configuration contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FieldSpec {
    String(StringSpec),
    Boolean(BooleanSpec),
    Number(NumberSpec),
    Enum(EnumSpec),
    Object(ObjectSpec),
    Union(UnionSpec),
    Pointer(PointerSpec),
}

/// Default for a string field: a literal, or a recipe for generating one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StringDefault {
    Literal(String),
    Charset { charset: String, len: u64 },
}

/// Default for a number field, kept integral when the field is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NumberDefault {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StringSpec {
    pub name: String,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<StringDefault>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BooleanSpec {
    pub name: String,
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct NumberSpec {
    pub name: String,
    pub nullable: bool,
    /// Interval notation, e.g. `[1,16777215]` or `[0,*)`.
    pub range: String,
    pub integral: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<NumberDefault>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EnumSpec {
    pub name: String,
    pub values: Vec<String>,
    pub default: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ObjectSpec {
    pub name: String,
    pub spec: ConfigSpec,
}

/// A tagged union: a discriminator key plus per-variant sub-fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct UnionSpec {
    pub name: String,
    pub tag: UnionTag,
    pub default: String,
    pub variants: IndexMap<String, ConfigSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct UnionTag {
    /// Key holding the discriminator inside the union's value.
    pub id: String,
    pub name: String,
    /// Display label per legal variant; the key set is the legal variant set.
    pub variant_names: IndexMap<String, String>,
}

/// A value injected by the host from another package's configuration or
/// interface addresses. Never entered by the user, never migrated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PointerSpec {
    pub name: String,
    pub subtype: String,
    pub package_id: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi: Option<bool>,
}

/// An ordered set of named fields. The top-level configuration contract is
/// one of these; objects and union variants nest them.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ConfigSpec(IndexMap<String, FieldSpec>);

impl ConfigSpec {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn with(mut self, key: impl Into<String>, field: FieldSpec) -> Self {
        self.0.insert(key.into(), field);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldSpec> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldSpec)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The structural shape a document must satisfy to count as configured
    /// against this contract.
    ///
    /// Pointers are host-injected and nullable fields are legitimately
    /// absent, so neither contributes. Containers are required as objects
    /// without descending: missing leaves inside them are recoverable from
    /// declared defaults and are not worth re-prompting for.
    pub fn required_shape(&self) -> Shape {
        let mut shape = Shape::new();
        for (name, field) in self.iter() {
            let kind = match field {
                FieldSpec::Pointer(_) => continue,
                FieldSpec::String(spec) if spec.nullable => continue,
                FieldSpec::Number(spec) if spec.nullable => continue,
                FieldSpec::String(_) => Kind::String,
                FieldSpec::Number(_) => Kind::Number,
                FieldSpec::Boolean(_) => Kind::Boolean,
                FieldSpec::Enum(_) => Kind::String,
                FieldSpec::Object(_) | FieldSpec::Union(_) => Kind::Object,
            };
            shape = shape.field(name, kind);
        }
        shape
    }
}

fn tor_address_pointer(name: &str, interface: &str) -> FieldSpec {
    FieldSpec::Pointer(PointerSpec {
        name: name.to_string(),
        subtype: "package".to_string(),
        package_id: "lnd".to_string(),
        target: "tor-address".to_string(),
        interface: Some(interface.to_string()),
        selector: None,
        multi: None,
    })
}

fn config_pointer(name: &str, package_id: &str, selector: &str) -> FieldSpec {
    FieldSpec::Pointer(PointerSpec {
        name: name.to_string(),
        subtype: "package".to_string(),
        package_id: package_id.to_string(),
        target: "config".to_string(),
        interface: None,
        selector: Some(selector.to_string()),
        multi: Some(false),
    })
}

fn boolean(name: &str, default: bool) -> FieldSpec {
    FieldSpec::Boolean(BooleanSpec {
        name: name.to_string(),
        default,
    })
}

fn integer(name: &str, range: &str, units: Option<&str>, default: Option<i64>) -> FieldSpec {
    FieldSpec::Number(NumberSpec {
        name: name.to_string(),
        nullable: false,
        range: range.to_string(),
        integral: true,
        units: units.map(str::to_string),
        default: default.map(NumberDefault::Int),
    })
}

fn nullable_integer(name: &str, range: &str, units: Option<&str>) -> FieldSpec {
    FieldSpec::Number(NumberSpec {
        name: name.to_string(),
        nullable: true,
        range: range.to_string(),
        integral: true,
        units: units.map(str::to_string),
        default: None,
    })
}

/// The contract for release `0.15.4.1`.
pub fn current() -> ConfigSpec {
    ConfigSpec::new()
        .with(
            "control-tor-address",
            tor_address_pointer("Control Tor Address", "control"),
        )
        .with(
            "peer-tor-address",
            tor_address_pointer("Peer Tor Address", "peer"),
        )
        .with(
            "watchtower-tor-address",
            tor_address_pointer("Watchtower Tor Address", "watchtower"),
        )
        .with(
            "alias",
            FieldSpec::String(StringSpec {
                name: "Alias".to_string(),
                nullable: true,
                pattern: Some(".{1,32}".to_string()),
                default: None,
            }),
        )
        .with(
            "color",
            FieldSpec::String(StringSpec {
                name: "Color".to_string(),
                nullable: false,
                pattern: Some("[0-9a-fA-F]{6}".to_string()),
                default: Some(StringDefault::Charset {
                    charset: "a-f,0-9".to_string(),
                    len: 6,
                }),
            }),
        )
        .with("accept-keysend", boolean("Accept Keysend", true))
        .with("accept-amp", boolean("Accept Spontaneous AMPs", false))
        .with("reject-htlc", boolean("Reject Routing Requests", false))
        .with(
            "min-chan-size",
            nullable_integer("Minimum Channel Size", "[1,16777215]", Some("satoshis")),
        )
        .with(
            "max-chan-size",
            nullable_integer("Maximum Channel Size", "[1,1000000000]", Some("satoshis")),
        )
        .with(
            "tor",
            FieldSpec::Object(ObjectSpec {
                name: "Tor Config".to_string(),
                spec: ConfigSpec::new()
                    .with("use-tor-only", boolean("Use Tor for all traffic", false))
                    .with("stream-isolation", boolean("Stream Isolation", false)),
            }),
        )
        .with(
            "bitcoind",
            FieldSpec::Union(UnionSpec {
                name: "Bitcoin Core".to_string(),
                tag: UnionTag {
                    id: "type".to_string(),
                    name: "Type".to_string(),
                    variant_names: IndexMap::from([
                        (
                            "none".to_string(),
                            "None (Built-in LND Neutrino)".to_string(),
                        ),
                        ("internal".to_string(), "Bitcoin Core".to_string()),
                        ("internal-proxy".to_string(), "Bitcoin Proxy".to_string()),
                    ]),
                },
                default: "internal-proxy".to_string(),
                variants: IndexMap::from([
                    ("none".to_string(), ConfigSpec::new()),
                    (
                        "internal".to_string(),
                        ConfigSpec::new()
                            .with(
                                "user",
                                config_pointer("RPC Username", "bitcoind", "$.rpc.username"),
                            )
                            .with(
                                "password",
                                config_pointer("RPC Password", "bitcoind", "$.rpc.password"),
                            ),
                    ),
                    (
                        "internal-proxy".to_string(),
                        ConfigSpec::new()
                            .with(
                                "user",
                                config_pointer(
                                    "RPC Username",
                                    "btc-rpc-proxy",
                                    "$.users[?(@.name == \"lnd\")].name",
                                ),
                            )
                            .with(
                                "password",
                                config_pointer(
                                    "RPC Password",
                                    "btc-rpc-proxy",
                                    "$.users[?(@.name == \"lnd\")].password",
                                ),
                            ),
                    ),
                ]),
            }),
        )
        .with(
            "autopilot",
            FieldSpec::Object(ObjectSpec {
                name: "Autopilot".to_string(),
                spec: ConfigSpec::new()
                    .with("enabled", boolean("Enabled", false))
                    .with("private", boolean("Private", false))
                    .with(
                        "maxchannels",
                        integer("Maximum Channels", "[1,*)", None, Some(5)),
                    )
                    .with(
                        "allocation",
                        FieldSpec::Number(NumberSpec {
                            name: "Allocation".to_string(),
                            nullable: false,
                            range: "[0,100]".to_string(),
                            integral: false,
                            units: Some("%".to_string()),
                            default: Some(NumberDefault::Int(60)),
                        }),
                    )
                    .with(
                        "min-channel-size",
                        integer(
                            "Minimum Channel Size",
                            "[0,*)",
                            Some("satoshis"),
                            Some(20000),
                        ),
                    )
                    .with(
                        "max-channel-size",
                        integer(
                            "Maximum Channel Size",
                            "[0,*)",
                            Some("satoshis"),
                            Some(16777215),
                        ),
                    )
                    .with(
                        "advanced",
                        FieldSpec::Object(ObjectSpec {
                            name: "Advanced".to_string(),
                            spec: ConfigSpec::new()
                                .with(
                                    "min-confirmations",
                                    integer(
                                        "Minimum Confirmations",
                                        "[0,*)",
                                        Some("blocks"),
                                        Some(1),
                                    ),
                                )
                                .with(
                                    "confirmation-target",
                                    integer(
                                        "Confirmation Target",
                                        "[0,*)",
                                        Some("blocks"),
                                        Some(1),
                                    ),
                                ),
                        }),
                    ),
            }),
        )
        .with(
            "advanced",
            FieldSpec::Object(ObjectSpec {
                name: "Advanced".to_string(),
                spec: ConfigSpec::new()
                    .with(
                        "debug-level",
                        FieldSpec::Enum(EnumSpec {
                            name: "Log Verbosity".to_string(),
                            values: ["trace", "debug", "info", "warn", "error", "critical"]
                                .iter()
                                .map(|s| s.to_string())
                                .collect(),
                            default: "info".to_string(),
                        }),
                    )
                    .with(
                        "db-bolt-no-freelist-sync",
                        boolean("Disallow Bolt DB Freelist Sync", false),
                    )
                    .with(
                        "db-bolt-auto-compact",
                        boolean("Compact Database on Startup", true),
                    )
                    .with(
                        "db-bolt-auto-compact-min-age",
                        integer(
                            "Minimum Autocompaction Age for Bolt DB",
                            "[0,*)",
                            Some("hours"),
                            Some(168),
                        ),
                    )
                    .with(
                        "db-bolt-db-timeout",
                        integer("Bolt DB Timeout", "[1,86400]", Some("seconds"), Some(60)),
                    )
                    .with(
                        "recovery-window",
                        nullable_integer("Recovery Window", "[1,*)", Some("blocks")),
                    )
                    .with(
                        "payments-expiration-grace-period",
                        integer(
                            "Payments Expiration Grace Period",
                            "[1,*)",
                            Some("seconds"),
                            Some(30),
                        ),
                    )
                    .with(
                        "default-remote-max-htlcs",
                        integer("Maximum Remote HTLCs", "[1,483]", Some("htlcs"), Some(483)),
                    )
                    .with(
                        "max-channel-fee-allocation",
                        FieldSpec::Number(NumberSpec {
                            name: "Maximum Channel Fee Allocation".to_string(),
                            nullable: false,
                            range: "[0.1,1]".to_string(),
                            integral: false,
                            units: None,
                            default: Some(NumberDefault::Float(0.5)),
                        }),
                    )
                    .with(
                        "max-commit-fee-rate-anchors",
                        integer(
                            "Maximum Commitment Fee for Anchor Channels",
                            "[1,*)",
                            None,
                            Some(10),
                        ),
                    )
                    .with(
                        "protocol-wumbo-channels",
                        boolean("Enable Wumbo Channels", false),
                    )
                    .with(
                        "protocol-no-anchors",
                        boolean("Disable Anchor Channels", false),
                    )
                    .with(
                        "protocol-disable-script-enforced-lease",
                        boolean("Disable Script Enforced Channel Leases", false),
                    )
                    .with(
                        "gc-canceled-invoices-on-startup",
                        boolean("Cleanup Canceled Invoices on Startup", false),
                    )
                    .with(
                        "bitcoin",
                        FieldSpec::Object(ObjectSpec {
                            name: "Bitcoin Channel Configuration".to_string(),
                            spec: ConfigSpec::new()
                                .with(
                                    "default-channel-confirmations",
                                    integer(
                                        "Default Channel Confirmations",
                                        "[1,6]",
                                        Some("blocks"),
                                        Some(3),
                                    ),
                                )
                                .with(
                                    "min-htlc",
                                    integer(
                                        "Minimum Incoming HTLC Size",
                                        "[1,*)",
                                        Some("millisatoshis"),
                                        Some(1),
                                    ),
                                )
                                .with(
                                    "min-htlc-out",
                                    integer(
                                        "Minimum Outgoing HTLC Size",
                                        "[1,*)",
                                        Some("millisatoshis"),
                                        Some(1000),
                                    ),
                                )
                                .with(
                                    "base-fee",
                                    integer(
                                        "Routing Base Fee",
                                        "[0,*)",
                                        Some("millisatoshi"),
                                        Some(1000),
                                    ),
                                )
                                .with(
                                    "fee-rate",
                                    integer(
                                        "Routing Fee Rate",
                                        "[1,1000000)",
                                        Some("sats per million"),
                                        Some(1),
                                    ),
                                )
                                .with(
                                    "time-lock-delta",
                                    integer("Time Lock Delta", "[6,144]", Some("blocks"), Some(40)),
                                ),
                        }),
                    ),
            }),
        )
}
