// Copyright (C) 2014-2026 The Crown Developers.
//
// mod.rs file belongs to the crown-rs project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

//! Config integration tests
//!
//! Parsing of network types and roles, and loading role profiles the way
//! the node's configuration file carries them.

use crown_config::{NetworkType, Role, RoleProfile, COIN};

#[test]
fn test_network_type_parsing() {
    assert_eq!("MainNet".parse::<NetworkType>().unwrap(), NetworkType::MainNet);
    assert_eq!("main".parse::<NetworkType>().unwrap(), NetworkType::MainNet);
    assert_eq!("test".parse::<NetworkType>().unwrap(), NetworkType::TestNet);
    assert_eq!("regtest".parse::<NetworkType>().unwrap(), NetworkType::RegTest);
    assert!("moon".parse::<NetworkType>().is_err());
}

#[test]
fn test_network_defaults_are_distinct() {
    let ports = [
        NetworkType::MainNet.default_port(),
        NetworkType::TestNet.default_port(),
        NetworkType::RegTest.default_port(),
    ];
    assert_ne!(ports[0], ports[1]);
    assert_ne!(ports[0], ports[2]);
    assert_ne!(NetworkType::MainNet.magic(), NetworkType::TestNet.magic());
}

#[test]
fn test_role_round_trip_through_display() {
    for role in Role::ALL {
        assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
    }
    assert_eq!("mn".parse::<Role>().unwrap(), Role::Masternode);
}

#[test]
fn test_profile_from_toml() {
    let text = r#"
        role = "systemnode"
        collateral = 50000000000
        min_confirmations = 3
        ping_interval_secs = 60
        default_port = 9340
        min_protocol_version = 70091
        expiration_secs = 600
        removal_secs = 900
    "#;
    let profile: RoleProfile = toml::from_str(text).unwrap();
    assert_eq!(profile.role, Role::Systemnode);
    assert_eq!(profile.collateral, 500 * COIN);
    assert_eq!(profile.min_confirmations, 3);
    assert!(profile.validate().is_ok());
}

#[test]
fn test_profile_json_shape() {
    let json = serde_json::to_value(RoleProfile::masternode()).unwrap();
    assert_eq!(json["role"], "masternode");
    assert_eq!(json["collateral"], 10_000 * COIN);
}
