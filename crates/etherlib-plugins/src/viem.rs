//! TypeScript generator targeting [viem](https://viem.sh).
//!
//! Emits three files:
//! - `abis.ts`: one `<camel>Abi` constant per contract
//! - `config.ts`: `chains` and `addresses` tables with client and address helpers
//! - `index.ts`: re-exports plus `get<Contract>` and `read<Contract><Function>` helpers

use std::collections::HashSet;
use std::fmt::Write;

use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;

use etherlib_core::{Plugin, ResolvedBuild};
use etherlib_types::naming::pascal_case;
use etherlib_types::Output;

use crate::ts::{abi_ident, banner, check_contract_names, to_ts_literal};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViemConfig {}

pub struct ViemPlugin;

impl ViemPlugin {
    pub fn new(_config: ViemConfig) -> Self {
        Self
    }
}

/// Read-only functions of an ABI, first overload only.
fn read_functions(abi: &Value) -> Vec<&str> {
    let mut seen = HashSet::new();
    abi.as_array()
        .into_iter()
        .flatten()
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("function"))
        .filter(|item| {
            matches!(
                item.get("stateMutability").and_then(Value::as_str),
                Some("view") | Some("pure")
            )
        })
        .filter_map(|item| item.get("name").and_then(Value::as_str))
        .filter(|name| !name.is_empty() && seen.insert(*name))
        .collect()
}

fn abis_file(build: &ResolvedBuild) -> Result<Output> {
    let mut content = String::new();
    for (name, abi) in &build.contracts {
        writeln!(
            content,
            "export const {} = {} as const\n",
            abi_ident(name),
            to_ts_literal(abi)?
        )?;
    }
    Ok(Output::new("abis.ts", content.trim_end()).with_imports(banner()))
}

fn config_file(build: &ResolvedBuild) -> Result<Output> {
    let imports = format!(
        "{}\nimport {{ createPublicClient, http }} from 'viem'\nimport type {{ Address, PublicClient }} from 'viem'",
        banner()
    );

    let mut content = String::new();
    writeln!(
        content,
        "export const chains = {} as const\n",
        to_ts_literal(&build.chains)?
    )?;
    writeln!(
        content,
        "export const addresses = {} as const\n",
        to_ts_literal(&build.addresses)?
    )?;
    content.push_str(
        r#"export type ChainAlias = keyof typeof chains
export type ContractName = keyof typeof addresses

export function createClient(alias: ChainAlias): PublicClient {
  return createPublicClient({ chain: chains[alias], transport: http() }) as PublicClient
}

export function addressFor(name: ContractName, client: PublicClient): Address {
  const chainId = client.chain?.id
  const deployed = addresses[name] as Record<number, Address | undefined>
  const address = chainId === undefined ? undefined : deployed[chainId]
  if (!address)
    throw new Error(`${name} is not deployed on chain ${chainId}`)
  return address
}"#,
    );

    Ok(Output::new("config.ts", content).with_imports(imports))
}

fn index_file(build: &ResolvedBuild) -> Result<Output> {
    let mut imports = format!(
        "{}\nimport {{ getContract }} from 'viem'\nimport type {{ Address, ContractFunctionArgs, PublicClient }} from 'viem'",
        banner()
    );
    if !build.contracts.is_empty() {
        let abis: Vec<String> = build.contracts.keys().map(|name| abi_ident(name)).collect();
        write!(imports, "\nimport {{ {} }} from './abis'", abis.join(", "))?;
    }
    if build.contracts.keys().any(|name| build.addresses.contains_key(name)) {
        imports.push_str("\nimport { addressFor } from './config'");
    }

    let mut content = String::from("export * from './abis'\nexport * from './config'\n");
    for (name, abi) in &build.contracts {
        let pascal = pascal_case(name);
        let abi_name = abi_ident(name);
        // Contracts without a known deployment need an explicit address.
        let (address_param, address_expr) = if build.addresses.contains_key(name) {
            (
                "address?: Address",
                format!("address ?? addressFor('{name}', client)"),
            )
        } else {
            ("address: Address", "address".to_string())
        };

        write!(
            content,
            "\nexport function get{pascal}(client: PublicClient, {address_param}) {{\n  \
             return getContract({{ abi: {abi_name}, address: {address_expr}, client }})\n}}\n"
        )?;

        for function in read_functions(abi) {
            write!(
                content,
                "\nexport function read{pascal}{fn_pascal}(\n  \
                 client: PublicClient,\n  \
                 args: ContractFunctionArgs<typeof {abi_name}, 'view' | 'pure', '{function}'>,\n  \
                 {address_param},\n) {{\n  \
                 return client.readContract({{ abi: {abi_name}, address: {address_expr}, functionName: '{function}', args }})\n}}\n",
                fn_pascal = pascal_case(function),
            )?;
        }
    }

    Ok(Output::new("index.ts", content.trim_end()).with_imports(imports))
}

#[async_trait::async_trait]
impl Plugin for ViemPlugin {
    fn name(&self) -> &str {
        "viem"
    }

    async fn run(&self, build: &ResolvedBuild) -> Result<Vec<Output>> {
        check_contract_names(build.contracts.keys())?;
        Ok(vec![abis_file(build)?, config_file(build)?, index_file(build)?])
    }
}
