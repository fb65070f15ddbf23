extern crate proc_macro;
use std::{ffi::OsStr, fs};

use proc_macro::TokenStream;
use quote::{format_ident, quote};

const RECIPE_DIR: &str = "recipes";

/// Turn a name into a valid function name by replacing bad characters.
fn functionify(name: String) -> String {
    name.chars()
        .map(|c| match c {
            '-' | '.' | ' ' => '_',
            other => other,
        })
        .collect()
}

/// Create a test case for each recipe in the `recipes` directory. Every recipe must cook into a
/// complete program.
#[proc_macro]
pub fn make_recipe_tests(_item: TokenStream) -> TokenStream {
    let mut files: Vec<_> = fs::read_dir(RECIPE_DIR)
        .expect("Could not read recipe directory")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension() == Some(OsStr::new("json")))
        .collect();
    files.sort();

    files
        .into_iter()
        .map(|file| {
            let file_name = file.file_stem().unwrap().to_str().unwrap().to_owned();
            let test_name = format_ident!("cook_recipe_{}", functionify(file_name));
            let file = file.to_str().unwrap().to_owned();

            quote! {
                #[test]
                fn #test_name() {
                    let recipe = crate::recipe::Recipe::from_file(#file)
                        .expect("Could not read recipe file");
                    let options = recipe.options(crate::compiler::CompileOptions::default());
                    let source = recipe.cook(&options).expect("Recipe did not compile");
                    assert!(source.contains("void main(void) {"));
                    assert!(source.ends_with("}\n"));
                }
            }
        })
        .collect::<proc_macro2::TokenStream>()
        .into()
}
