pub mod bgp_ls;
