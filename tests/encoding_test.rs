//! Calldata and log payload layout checks

use std::sync::Arc;

use alloy::rpc::types::{Filter, Log, TransactionReceipt, TransactionRequest};
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{keccak256, Address, Bytes, LogData, B256, U256};
use anyhow::Result;
use tokio::sync::mpsc;

use crowdfund_client::abi::CrowdfundAbi;
use crowdfund_client::{Crowdfund, Deployment, EthereumProvider, ProjectStarted, StartProject};

struct NullProvider;

#[async_trait::async_trait]
impl EthereumProvider for NullProvider {
    async fn block_number(&self) -> Result<u64> {
        Ok(0)
    }
    async fn client_version(&self) -> Result<String> {
        Ok("null".to_string())
    }
    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(Vec::new())
    }
    async fn call(&self, _request: TransactionRequest) -> Result<Bytes> {
        anyhow::bail!("no network in this test")
    }
    async fn send_transaction(&self, _request: TransactionRequest) -> Result<B256> {
        anyhow::bail!("no network in this test")
    }
    async fn get_receipt(&self, _hash: B256) -> Result<Option<TransactionReceipt>> {
        Ok(None)
    }
    async fn get_logs(&self, _filter: &Filter) -> Result<Vec<Log>> {
        Ok(Vec::new())
    }
    async fn subscribe_logs(&self, _filter: &Filter) -> Result<mpsc::Receiver<Log>> {
        let (_, rx) = mpsc::channel(1);
        Ok(rx)
    }
    fn supports_subscriptions(&self) -> bool {
        false
    }
    fn endpoint_name(&self) -> String {
        "null".to_string()
    }
}

fn handle() -> Crowdfund {
    Crowdfund::new(Arc::new(NullProvider), Deployment::Primary.address()).unwrap()
}

fn head_word(calldata: &[u8], slot: usize) -> U256 {
    let start = 4 + slot * 32;
    U256::from_be_slice(&calldata[start..start + 32])
}

#[test]
fn start_project_calldata_layout() {
    let params = StartProject {
        title: "Tiny Library".to_string(),
        description: "A street-corner book exchange".to_string(),
        duration_days: U256::from(45u64),
        goal_amount: U256::from(750_000_000_000_000_000u64),
    };
    let calldata = handle().start_project_calldata(&params).unwrap();

    // selector, then a 4-word head: two string offsets and the two uints
    let selector = keccak256("startProject(string,string,uint256,uint256)".as_bytes());
    assert_eq!(&calldata[..4], &selector[..4]);
    assert_eq!((calldata.len() - 4) % 32, 0);

    // first string's tail starts right after the 4 head words
    assert_eq!(head_word(&calldata, 0), U256::from(128u64));
    assert_eq!(head_word(&calldata, 2), params.duration_days);
    assert_eq!(head_word(&calldata, 3), params.goal_amount);

    // title length and bytes sit at the first tail
    let tail = 4 + 128;
    assert_eq!(
        U256::from_be_slice(&calldata[tail..tail + 32]),
        U256::from(params.title.len() as u64)
    );
    assert_eq!(
        &calldata[tail + 32..tail + 32 + params.title.len()],
        params.title.as_bytes()
    );
}

#[test]
fn project_started_filter_targets_the_deployment() {
    let handle = handle();
    let filter = handle.project_started_filter().unwrap();

    let expected_topic =
        keccak256("ProjectStarted(address,address,string,string,uint256,uint256)".as_bytes());
    assert!(filter.topics[0].matches(&expected_topic));
    assert!(filter.address.matches(&Deployment::Primary.address()));
}

#[test]
fn project_started_decodes_from_a_raw_log() {
    let starter = Address::new([0xbb; 20]);
    let child = Address::new([0xcc; 20]);
    let deadline = U256::from(1_767_225_600u64);
    let goal = U256::from(5_000_000_000_000_000_000u64);

    let data = DynSolValue::Tuple(vec![
        DynSolValue::Address(child),
        DynSolValue::Address(starter),
        DynSolValue::String("Tiny Library".to_string()),
        DynSolValue::String("A street-corner book exchange".to_string()),
        DynSolValue::Uint(deadline, 256),
        DynSolValue::Uint(goal, 256),
    ])
    .abi_encode();

    let abi = CrowdfundAbi::load().unwrap();
    let topic = CrowdfundAbi::event_topic(abi.project_started().unwrap());

    let mut log = Log::default();
    log.inner.address = Deployment::Primary.address();
    log.inner.data = LogData::new_unchecked(vec![topic], Bytes::from(data));

    let event = ProjectStarted::from_log(&log).unwrap();
    assert_eq!(event.contract_address, child);
    assert_eq!(event.project_starter, starter);
    assert_eq!(event.project_title, "Tiny Library");
    assert_eq!(event.project_desc, "A street-corner book exchange");
    assert_eq!(event.deadline, deadline);
    assert_eq!(event.goal_amount, goal);
}
