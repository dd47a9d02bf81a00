//! Integration tests for flow-resolver against a project laid out on disk.
//!
//! These verify relative-import resolution through `FileLoader` end to end.

use anyhow::Result;
use flow_deployer_types::{Address, Aliases};
use flow_resolver::{DeploymentImports, FileLoader, ProgramImports, ResolveError};
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, location: &str, code: &str) -> Result<()> {
    let path = root.join(location);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, code)?;
    Ok(())
}

/// Lay out a small NFT project:
///
/// ```text
/// contracts/
///   standards/NonFungibleToken.cdc
///   ExampleNFT.cdc      imports ./standards/NonFungibleToken.cdc and FungibleToken (alias)
///   Marketplace.cdc     imports ./ExampleNFT.cdc
/// transactions/
///   mint.cdc            imports ../contracts/ExampleNFT.cdc
/// ```
fn project() -> Result<TempDir> {
    let dir = TempDir::new()?;
    let root = dir.path();
    write(
        root,
        "contracts/standards/NonFungibleToken.cdc",
        "access(all) contract NonFungibleToken {}\n",
    )?;
    write(
        root,
        "contracts/ExampleNFT.cdc",
        "import NonFungibleToken from \"./standards/NonFungibleToken.cdc\"\n\
         import FungibleToken from \"FungibleToken\"\n\
         access(all) contract ExampleNFT {}\n",
    )?;
    write(
        root,
        "contracts/Marketplace.cdc",
        "import ExampleNFT from \"./ExampleNFT.cdc\"\n\
         access(all) contract Marketplace {}\n",
    )?;
    write(
        root,
        "transactions/mint.cdc",
        "import ExampleNFT from \"../contracts/ExampleNFT.cdc\"\n\
         transaction { execute {} }\n",
    )?;
    Ok(dir)
}

fn aliases() -> Aliases {
    Aliases::try_from_pairs([("FungibleToken", "ee82856bf20e2aa6")]).expect("valid alias")
}

/// Test deploying the contracts of a project in dependency order.
#[test]
fn test_deploy_project_in_dependency_order() -> Result<()> {
    let dir = project()?;
    let mut deployment = DeploymentImports::new(FileLoader::new(dir.path()), aliases());

    deployment.add_program(
        "./contracts/Marketplace.cdc",
        Address::from_hex("0x3")?,
        "market",
        vec![],
    )?;
    deployment.add_program(
        "./contracts/ExampleNFT.cdc",
        Address::from_hex("0x2")?,
        "nft",
        vec![],
    )?;
    deployment.add_program(
        "contracts/standards/NonFungibleToken.cdc",
        Address::from_hex("0x1")?,
        "standards",
        vec![],
    )?;
    deployment.sort()?;

    let order: Vec<&str> = deployment.programs().map(|p| p.name()).collect();
    assert_eq!(order, vec!["NonFungibleToken", "ExampleNFT", "Marketplace"]);

    let nft = deployment
        .imports()
        .program_by_location("contracts/ExampleNFT.cdc")
        .expect("lookup uses canonical locations");
    assert_eq!(
        nft.replaced_imports(),
        "import NonFungibleToken from 0x0000000000000001\n\
         import FungibleToken from 0xee82856bf20e2aa6\n\
         access(all) contract ExampleNFT {}\n"
    );
    Ok(())
}

/// Test that a transaction resolves `../` imports against its own directory.
#[test]
fn test_transaction_with_parent_relative_import() -> Result<()> {
    let dir = project()?;
    let mut imports = ProgramImports::new(FileLoader::new(dir.path()), aliases());

    imports.add_program("transactions/mint.cdc", Address::ZERO, "", vec![])?;
    imports.add_program(
        "contracts/ExampleNFT.cdc",
        Address::from_hex("0x2")?,
        "nft",
        vec![],
    )?;
    imports.add_program(
        "contracts/standards/NonFungibleToken.cdc",
        Address::from_hex("0x1")?,
        "standards",
        vec![],
    )?;
    imports.resolve()?;

    let mint = imports.programs().next().expect("mint");
    assert!(!mint.is_contract());
    assert_eq!(
        mint.replaced_imports(),
        "import ExampleNFT from 0x0000000000000002\ntransaction { execute {} }\n"
    );
    Ok(())
}

/// Test that the same file under two spellings is a duplicate.
#[test]
fn test_equivalent_paths_are_duplicates() -> Result<()> {
    let dir = project()?;
    let mut imports = ProgramImports::new(FileLoader::new(dir.path()), Aliases::new());

    imports.add_program("contracts/ExampleNFT.cdc", Address::from_hex("0x2")?, "", vec![])?;
    let err = imports
        .add_program(
            "./contracts/../contracts/ExampleNFT.cdc",
            Address::from_hex("0x2")?,
            "",
            vec![],
        )
        .unwrap_err();
    assert!(matches!(err, ResolveError::DuplicateLocation { .. }));
    Ok(())
}

/// Test that a missing file surfaces as a load error naming the location.
#[test]
fn test_missing_file() -> Result<()> {
    let dir = project()?;
    let mut imports = ProgramImports::new(FileLoader::new(dir.path()), Aliases::new());

    let err = imports
        .add_program("contracts/Nope.cdc", Address::ZERO, "", vec![])
        .unwrap_err();
    assert!(matches!(
        err,
        ResolveError::Load { ref location, .. } if location == "contracts/Nope.cdc"
    ));
    assert!(err.to_string().contains("Nope.cdc"));
    Ok(())
}

/// Test that an unresolvable relative import is reported as written.
#[test]
fn test_unresolved_relative_import() -> Result<()> {
    let dir = project()?;
    let mut imports = ProgramImports::new(FileLoader::new(dir.path()), Aliases::new());

    imports.add_program("contracts/Marketplace.cdc", Address::from_hex("0x3")?, "", vec![])?;
    match imports.resolve().unwrap_err() {
        ResolveError::UnresolvedImports(unresolved) => {
            assert_eq!(unresolved.len(), 1);
            assert_eq!(unresolved[0].from, "Marketplace");
            assert_eq!(unresolved[0].import, "./ExampleNFT.cdc");
        }
        other => panic!("expected unresolved imports, got {:?}", other),
    }
    Ok(())
}
