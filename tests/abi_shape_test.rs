//! Structural checks on the static contract data
//!
//! The ABI and the deployment addresses are fixed literals; these tests pin
//! their shape so an accidental edit can't silently change the wire contract.

use alloy_primitives::keccak256;
use crowdfund_client::abi::CrowdfundAbi;
use crowdfund_client::Deployment;

#[test]
fn start_project_is_the_only_state_changing_function() {
    let abi = CrowdfundAbi::load().unwrap();
    let raw = abi.raw();

    let entries = raw.functions.get("startProject").unwrap();
    assert_eq!(entries.len(), 1);

    let function = &entries[0];
    assert_eq!(function.state_mutability, alloy_json_abi::StateMutability::NonPayable);
    assert!(function.outputs.is_empty());

    let params: Vec<(&str, &str)> = function
        .inputs
        .iter()
        .map(|p| (p.name.as_str(), p.ty.as_str()))
        .collect();
    assert_eq!(
        params,
        [
            ("title", "string"),
            ("description", "string"),
            ("durationInDays", "uint256"),
            ("amountToRaise", "uint256"),
        ]
    );
}

#[test]
fn return_all_projects_is_the_only_view_function() {
    let abi = CrowdfundAbi::load().unwrap();
    let raw = abi.raw();

    let views: Vec<_> = raw
        .functions()
        .filter(|f| f.state_mutability == alloy_json_abi::StateMutability::View)
        .collect();
    assert_eq!(views.len(), 1);

    let function = views[0];
    assert_eq!(function.name, "returnAllProjects");
    assert!(function.inputs.is_empty());
    assert_eq!(function.outputs.len(), 1);
    assert_eq!(function.outputs[0].ty, "address[]");
}

#[test]
fn project_started_has_six_non_indexed_fields() {
    let abi = CrowdfundAbi::load().unwrap();
    let raw = abi.raw();

    assert_eq!(raw.events.len(), 1);
    let event = abi.project_started().unwrap();

    assert!(!event.anonymous);
    assert_eq!(event.inputs.len(), 6);
    for field in &event.inputs {
        assert!(!field.indexed, "field '{}' should not be indexed", field.name);
    }

    let kinds: Vec<&str> = event.inputs.iter().map(|f| f.ty.as_str()).collect();
    assert_eq!(
        kinds,
        ["address", "address", "string", "string", "uint256", "uint256"]
    );
}

#[test]
fn selectors_derive_from_signatures() {
    let abi = CrowdfundAbi::load().unwrap();

    let start = CrowdfundAbi::selector(abi.start_project().unwrap());
    let expected = keccak256("startProject(string,string,uint256,uint256)".as_bytes());
    assert_eq!(start, [expected[0], expected[1], expected[2], expected[3]]);

    let topic = CrowdfundAbi::event_topic(abi.project_started().unwrap());
    assert_eq!(
        topic,
        keccak256("ProjectStarted(address,address,string,string,uint256,uint256)".as_bytes())
    );
}

#[test]
fn deployment_literals_differ() {
    assert_ne!(
        Deployment::Primary.address_literal(),
        Deployment::Secondary.address_literal()
    );
    assert_ne!(
        Deployment::Primary.address(),
        Deployment::Secondary.address()
    );
}

#[test]
fn abi_load_is_stable() {
    // Loading twice yields the same shape; nothing depends on a shared instance
    let first = CrowdfundAbi::load().unwrap();
    let second = CrowdfundAbi::load().unwrap();

    assert_eq!(
        CrowdfundAbi::selector(first.start_project().unwrap()),
        CrowdfundAbi::selector(second.start_project().unwrap())
    );
    assert_eq!(
        CrowdfundAbi::event_topic(first.project_started().unwrap()),
        CrowdfundAbi::event_topic(second.project_started().unwrap())
    );
}
