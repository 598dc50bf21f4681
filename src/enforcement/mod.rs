pub mod challan_ledger;
