use tezos_notary_sdk::{ContractError, MemoryContract, MemoryToolkit, NotaryClientFactory, Storage};

#[tokio::test]
async fn test_factory_resolves_registered_contract() {
    let toolkit =
        MemoryToolkit::new().with_contract(MemoryContract::new("KT1Notary", Storage::new()));

    let client = NotaryClientFactory::at(&"KT1Notary".into(), &toolkit)
        .await
        .expect("contract should resolve");

    assert_eq!(client.address().as_str(), "KT1Notary");
    assert!(client.fetch_storage().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_factory_fails_eagerly_for_unknown_address() {
    let toolkit = MemoryToolkit::new();

    let result = NotaryClientFactory::at(&"KT1Missing".into(), &toolkit).await;

    match result {
        Err(ContractError::UnknownContract(address)) => {
            assert_eq!(address.as_str(), "KT1Missing")
        }
        Err(e) => panic!("Expected UnknownContract, got: {}", e),
        Ok(_) => panic!("Expected resolution to fail"),
    }
}
