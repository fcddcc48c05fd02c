use super::client::NotaryClient;
use crate::domain::Address;
use crate::infrastructure::contract::{ContractError, Toolkit};

pub struct NotaryClientFactory;

impl NotaryClientFactory {
    /// Resolve `address` through `toolkit` and wrap the resulting handle.
    ///
    /// Resolution errors are returned as the toolkit reports them.
    pub async fn at<T: Toolkit>(
        address: &Address,
        toolkit: &T,
    ) -> Result<NotaryClient<T::Contract>, ContractError> {
        let contract = toolkit.at(address).await?;
        Ok(NotaryClient::new(contract))
    }
}
