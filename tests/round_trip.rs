//! Round-trip of a compact SD-JWT presentation token: parsing the assembled
//! wire form and reassembling it from its parts must be byte-identical.

use sd_disclosure_core::disclosure::{Disclosure, SaltFactory};
use sd_disclosure_core::format::sd_jwt::assemble_presentation;
use sd_disclosure_core::path::CredentialPath;
use sd_disclosure_core::value::Value;

struct FixedSalts(Vec<&'static str>);
impl SaltFactory for FixedSalts {
    fn next_salt(&mut self) -> String {
        self.0.remove(0).to_string()
    }
}

fn parse_presentation(token: &str) -> (String, Vec<String>) {
    let mut parts = token.split('~');
    let jws = parts.next().unwrap().to_string();
    let mut disclosures = Vec::new();
    for part in parts {
        if part.is_empty() {
            continue;
        }
        disclosures.push(part.to_string());
    }
    (jws, disclosures)
}

#[test]
fn compact_sd_jwt_presentation_round_trips() {
    let mut salts = FixedSalts(vec!["s1", "s2"]);
    let d1 = Disclosure::property(
        CredentialPath::parse("/credentialSubject/given_name").unwrap(),
        "given_name",
        Value::String("Erika".into()),
        &mut salts,
    );
    let d2 = Disclosure::property(
        CredentialPath::parse("/credentialSubject/family_name").unwrap(),
        "family_name",
        Value::String("Mustermann".into()),
        &mut salts,
    );

    let jws = "header.payload.signature";
    let token = assemble_presentation(jws, &[d1, d2], None);

    let (parsed_jws, parsed_disclosures) = parse_presentation(&token);
    assert_eq!(parsed_jws, jws);
    assert_eq!(parsed_disclosures.len(), 2);

    let mut rebuilt = format!("{parsed_jws}~");
    for disclosure in &parsed_disclosures {
        rebuilt.push_str(disclosure);
        rebuilt.push('~');
    }
    assert_eq!(rebuilt, token);
}

#[test]
fn compact_sd_jwt_presentation_with_key_binding_round_trips() {
    let mut salts = FixedSalts(vec!["s1"]);
    let disclosure = Disclosure::property(
        CredentialPath::parse("/credentialSubject/id").unwrap(),
        "id",
        Value::String("did:ex:123".into()),
        &mut salts,
    );
    let token = assemble_presentation("h.p.s", &[disclosure], Some("kb.header.sig"));
    assert!(token.ends_with("kb.header.sig"));
    assert_eq!(token.matches('~').count(), 2);
}
