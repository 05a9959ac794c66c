//! TypeScript generator targeting [ethers v6](https://docs.ethers.org/v6/).
//!
//! Emits `library.ts` (proxy and lookup helpers) and `index.ts`, which holds
//! the `chains` and `addresses` tables, a `connection` that swaps the active
//! provider, signer and chain, and a `get<Contract>` factory per contract.
//! Contracts resolve their address from the active chain unless one is passed.

use std::fmt::Write;

use anyhow::Result;
use serde::Deserialize;

use etherlib_core::{Plugin, ResolvedBuild};
use etherlib_types::naming::pascal_case;
use etherlib_types::Output;

use crate::ts::{abi_ident, banner, check_contract_names, to_ts_literal};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EthersConfig {}

pub struct EthersPlugin;

impl EthersPlugin {
    pub fn new(_config: EthersConfig) -> Self {
        Self
    }
}

const LIBRARY: &str = r#"export interface GetContractConfig {
  abi: readonly unknown[]
  address?: string
  runner?: ContractRunner
}

export interface GetContractAtConfig {
  address?: string
  runner?: ContractRunner
}

export type ConnectionAccountConfig =
  | { type: 'eip-1193', value?: any }
  | { type: 'provideKey', value: string }

export type Proxied<T extends object> = T & {
  proxy: { update: (object?: T) => void, resolve: () => T | undefined }
}

export function proxy<T extends object>(name: string, initObject?: T): Proxied<T> {
  initObject && Reflect.set(initObject, 'proxyUpdated', true)
  let target: any = initObject || { proxyUpdated: false }
  const proxied = new Proxy({} as T, {
    get: (_, p) => {
      if (p === 'proxy')
        return { update, resolve }
      if (!Reflect.get(target ?? {}, 'proxyUpdated'))
        throw new Error(`Proxy not updated. Call ${name}.proxy.update() to update the proxy.`)
      return typeof target?.[p] === 'function' ? target[p].bind(target) : target?.[p]
    },
    set: (_, p, v) => {
      target[p] = v
      return true
    },
  })
  function update(object?: T): void {
    if (object) {
      Reflect.set(object, 'proxyUpdated', true)
      target = object
    }
    else {
      target = undefined
    }
  }
  function resolve(): T | undefined {
    return Reflect.get(target ?? {}, 'proxyUpdated') ? target : undefined
  }
  return proxied as Proxied<T>
}

export function get(target: any, keys: string): any {
  return keys.split('.').reduce((acc, key) => acc?.[key], target)
}

export function set<T extends object>(target: T, property: string, value: any): T {
  Reflect.set(target, property, value)
  return target
}"#;

const CONNECTION: &str = r#"export const connection = proxy('connection', {
  connect(chain: Chain, account?: ConnectionAccountConfig) {
    const client = new JsonRpcProvider(chain.rpcUrls.default.http[0])

    this.client.proxy.update(client)
    this.chain.proxy.update(chain)

    if (account?.type === 'eip-1193') {
      return (async () => {
        const provider = new BrowserProvider(account.value)
        const signer = await provider.getSigner()
        this.wallet.proxy.update(signer)

        const hexId = `0x${chain.id.toString(16)}`
        const network = await provider.getNetwork()
        if (network.chainId !== BigInt(chain.id)) {
          await provider.send('wallet_switchEthereumChain', [{ chainId: hexId }]).catch(async (error) => {
            if (error.code !== 4902)
              throw error
            await provider.send('wallet_addEthereumChain', [{
              chainId: hexId,
              chainName: chain.name,
              nativeCurrency: (chain as any).nativeCurrency,
              rpcUrls: chain.rpcUrls.default.http,
              blockExplorerUrls: [(chain as any).blockExplorers?.default?.url].filter(Boolean),
            }])
            await provider.send('wallet_switchEthereumChain', [{ chainId: hexId }])
          })
        }
      })()
    }
    if (account?.type === 'provideKey')
      this.wallet.proxy.update(new Wallet(account.value, client))
  },
  update(chain?: Chain, client?: JsonRpcProvider, signer?: Signer) {
    if (chain)
      this.chain.proxy.update(chain)
    if (client)
      this.client.proxy.update(client)
    if (signer)
      this.wallet.proxy.update(signer)
  },
  client,
  wallet,
  chain,
})"#;

const GET_CONTRACT: &str = r#"export function getContract(config: GetContractConfig): Contract {
  return new Contract(
    config.address || get(chain, `contracts.${get(config.abi, 'name')}.address`),
    config.abi as InterfaceAbi,
    config.runner || client,
  )
}"#;

fn library_file() -> Output {
    Output::new("library.ts", LIBRARY).with_imports(format!(
        "{}\nimport type {{ ContractRunner }} from 'ethers'",
        banner()
    ))
}

fn index_file(build: &ResolvedBuild) -> Result<Output> {
    let imports = format!(
        "{}\nimport {{ type InterfaceAbi, type Signer, BrowserProvider, Contract, JsonRpcProvider, Wallet }} from 'ethers'\n\
         import {{ get, proxy, set, type ConnectionAccountConfig, type GetContractAtConfig, type GetContractConfig }} from './library'",
        banner()
    );

    let mut content = String::new();
    writeln!(
        content,
        "export const chains = {} as const\n",
        to_ts_literal(&build.chains)?
    )?;
    content.push_str(
        "export type Chain = typeof chains[keyof typeof chains]\n\n\
         export const client = proxy<JsonRpcProvider>('client')\n\
         export const wallet = proxy<Signer>('wallet')\n\
         export const chain = proxy<Chain>('chain')\n\n",
    );
    content.push_str(CONNECTION);
    writeln!(
        content,
        "\n\nexport const addresses = {} as const\n",
        to_ts_literal(&build.addresses)?
    )?;

    for (name, abi) in &build.contracts {
        writeln!(
            content,
            "export const {} = set({} as const, 'name', '{name}')\n",
            abi_ident(name),
            to_ts_literal(abi)?
        )?;
    }

    content.push_str(GET_CONTRACT);

    for name in build.contracts.keys() {
        let abi_name = abi_ident(name);
        write!(
            content,
            "\n\n/**\n * Wraps __{{@link getContract}}__ with `abi` set to __{{@link {abi_name}}}__\n */\n\
             export function get{pascal}(config: GetContractAtConfig = {{}}): Contract {{\n  \
             return getContract({{ ...config, abi: {abi_name} }})\n}}",
            pascal = pascal_case(name),
        )?;
    }

    Ok(Output::new("index.ts", content).with_imports(imports))
}

#[async_trait::async_trait]
impl Plugin for EthersPlugin {
    fn name(&self) -> &str {
        "ethers"
    }

    async fn run(&self, build: &ResolvedBuild) -> Result<Vec<Output>> {
        check_contract_names(build.contracts.keys())?;
        Ok(vec![library_file(), index_file(build)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etherlib_types::{CanonicalChain, ChainContract, ChainId};
    use serde_json::json;

    fn build() -> ResolvedBuild {
        let mut chain: CanonicalChain = serde_json::from_value(json!({
            "id": 31337,
            "name": "Anvil",
            "rpcUrls": { "default": { "http": ["http://127.0.0.1:8545"] } }
        }))
        .unwrap();
        chain
            .contracts
            .insert("Counter".into(), ChainContract::at("0xc0"));

        let mut build = ResolvedBuild::default();
        build.contracts.insert(
            "Counter".into(),
            json!([{ "type": "function", "name": "number", "inputs": [], "outputs": [{ "type": "uint256" }], "stateMutability": "view" }]),
        );
        build.contracts.insert("ERC20".into(), json!([]));
        build
            .addresses
            .entry("Counter".into())
            .or_default()
            .insert(ChainId(31337), "0xc0".into());
        build.chains.insert("anvil".into(), chain);
        build
    }

    async fn outputs(build: &ResolvedBuild) -> Vec<Output> {
        EthersPlugin::new(EthersConfig::default())
            .run(build)
            .await
            .unwrap()
    }

    fn find(outputs: &[Output], id: &str) -> String {
        outputs
            .iter()
            .find(|output| output.id == id)
            .map(Output::render)
            .unwrap()
    }

    #[tokio::test]
    async fn test_emits_library_and_index() {
        let outputs = outputs(&build()).await;
        let ids: Vec<&str> = outputs.iter().map(|output| output.id.as_str()).collect();
        assert_eq!(ids, vec!["library.ts", "index.ts"]);

        let library = find(&outputs, "library.ts");
        assert!(library.starts_with("// Generated by etherlib."));
        assert!(library.contains("export function proxy<T extends object>"));
    }

    #[tokio::test]
    async fn test_index_wires_chains_connection_and_getters() {
        let index = find(&outputs(&build()).await, "index.ts");

        assert!(index.contains("export const chains = {\n  \"anvil\": {"));
        assert!(index.contains("\"Counter\": {\n        \"address\": \"0xc0\""));
        assert!(index.contains("export const connection = proxy('connection', {"));
        assert!(index.contains("export const chain = proxy<Chain>('chain')"));
        assert!(index.contains("export const counterAbi = set(["));
        assert!(index.contains("as const, 'name', 'Counter')"));
        assert!(index.contains("export const erc20Abi = set([] as const, 'name', 'ERC20')"));
        assert!(index.contains("export function getCounter(config: GetContractAtConfig = {}): Contract {"));
        assert!(index.contains("return getContract({ ...config, abi: counterAbi })"));
        assert!(index.contains("export function getErc20("));
    }

    #[tokio::test]
    async fn test_empty_build_still_has_connection() {
        let index = find(&outputs(&ResolvedBuild::default()).await, "index.ts");
        assert!(index.contains("export const chains = {} as const"));
        assert!(index.contains("export function getContract(config: GetContractConfig): Contract"));
        assert!(!index.contains("export function getCounter"));
    }

    #[tokio::test]
    async fn test_rejects_unquotable_contract_name() {
        let mut build = build();
        build.contracts.insert("it's".into(), json!([]));

        let err = EthersPlugin::new(EthersConfig::default())
            .run(&build)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("cannot be used in generated code"));
    }
}
