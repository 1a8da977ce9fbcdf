use quote::{format_ident, quote};

/// Expands to one `#[test]` per `.lox` file under `tests/lox`, each calling
/// `lox_expect` with the file's contents.
#[proc_macro]
pub fn generate_tests(_: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let root_dir = format!("{}/../lox", env!("CARGO_MANIFEST_DIR"));
    let mut files: Vec<_> = walkdir::WalkDir::new(&root_dir)
        .into_iter()
        .flatten()
        .filter(|entry| entry.path().extension() == Some("lox".as_ref()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();

    let tests = files.iter().map(|path| {
        let test_file_path = path.to_string_lossy();
        let relative_test_path = path.strip_prefix(&root_dir).unwrap().with_extension("");
        let test_ident = format_ident!(
            "test_{}",
            relative_test_path.to_string_lossy().replace(['/', '\\', '-'], "_")
        );
        quote! {
            #[test]
            fn #test_ident() {
                lox_expect(std::fs::read_to_string(#test_file_path).unwrap().as_str());
            }
        }
    });

    quote! {
        #[ctor::ctor]
        fn init() {
            env_logger::init();
        }

        #(#tests)*
    }
    .into()
}
