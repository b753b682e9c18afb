// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Procedural macros for the `selftest` crate.
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Error, ItemFn, LitStr, ReturnType, parse::Parser, parse_macro_input};

/// Registers a function as a unit test.
///
/// # Example
///
/// ```rust,ignore
/// use selftest::{check, def_test};
///
/// #[def_test]
/// fn addition() {
///     check!(2 + 2 == 4);
/// }
///
/// #[def_test(name = "parses the default port")]
/// fn default_port() -> selftest::TestResult {
///     check!(parse_port("80")? == 80);
///     Ok(())
/// }
/// ```
///
/// The function takes no arguments. It may return `selftest::TestResult`;
/// if it returns nothing, the body is wrapped to return `Ok(())` when it
/// falls off the end.
#[proc_macro_attribute]
pub fn def_test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    expand_def_test(attr.into(), input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn parse_name(attr: TokenStream2) -> syn::Result<Option<LitStr>> {
    let mut name = None;
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            name = Some(meta.value()?.parse::<LitStr>()?);
            Ok(())
        } else {
            Err(meta.error("expect `#[def_test]` or `#[def_test(name = \"...\")]`"))
        }
    });
    parser.parse2(attr)?;
    Ok(name)
}

fn expand_def_test(attr: TokenStream2, input: ItemFn) -> syn::Result<TokenStream2> {
    let name = parse_name(attr)?;
    let sig = &input.sig;

    if !sig.inputs.is_empty() {
        return Err(Error::new_spanned(
            &sig.inputs,
            "expect no input arguments for a unit test",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &sig.generics,
            "a unit test cannot be generic",
        ));
    }
    if let Some(asyncness) = &sig.asyncness {
        return Err(Error::new_spanned(asyncness, "a unit test cannot be async"));
    }
    if let Some(unsafety) = &sig.unsafety {
        return Err(Error::new_spanned(unsafety, "a unit test cannot be unsafe"));
    }
    if let Some(constness) = &sig.constness {
        return Err(Error::new_spanned(constness, "a unit test cannot be const"));
    }
    if let Some(abi) = &sig.abi {
        return Err(Error::new_spanned(abi, "a unit test cannot declare an ABI"));
    }

    let fn_name = &sig.ident;
    let fn_attrs = &input.attrs;
    let fn_vis = &input.vis;
    let block = &input.block;
    let name = name
        .map(|lit| lit.value())
        .unwrap_or_else(|| fn_name.to_string());

    let descriptor_name = format_ident!(
        "__SELFTEST_DESCRIPTOR_{}",
        fn_name.to_string().to_uppercase()
    );

    // Bodies without a return type still get to use the check macros.
    let test_fn = match &sig.output {
        ReturnType::Type(..) => quote! {
            #(#fn_attrs)*
            #fn_vis #sig #block
        },
        ReturnType::Default => quote! {
            #(#fn_attrs)*
            #[allow(unreachable_code)]
            #fn_vis fn #fn_name() -> ::selftest::TestResult {
                #block
                ::core::result::Result::Ok(())
            }
        },
    };

    Ok(quote! {
        #test_fn

        #[::selftest::__private::linkme::distributed_slice(::selftest::UNIT_TESTS)]
        #[linkme(crate = ::selftest::__private::linkme)]
        #[allow(non_upper_case_globals)]
        static #descriptor_name: ::selftest::TestCase = ::selftest::TestCase::new(
            #name,
            ::core::module_path!(),
            ::core::file!(),
            ::core::line!(),
            #fn_name,
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(attr: TokenStream2, item: TokenStream2) -> syn::Result<String> {
        let input: ItemFn = syn::parse2(item)?;
        expand_def_test(attr, input).map(|tokens| tokens.to_string())
    }

    #[test]
    fn plain_function_is_wrapped() {
        let out = expand(quote!(), quote!(fn adds() { let _ = 1 + 1; })).unwrap();
        assert!(out.contains(":: selftest :: TestResult"));
        assert!(out.contains("__SELFTEST_DESCRIPTOR_ADDS"));
        assert!(out.contains("\"adds\""));
        assert!(out.contains("Ok (())"));
    }

    #[test]
    fn returning_function_is_kept() {
        let out = expand(
            quote!(),
            quote!(fn parses() -> selftest::TestResult { Ok(()) }),
        )
        .unwrap();
        assert!(out.contains("fn parses () -> selftest :: TestResult"));
        assert!(!out.contains("unreachable_code"));
    }

    #[test]
    fn name_can_be_overridden() {
        let out = expand(quote!(name = "custom name"), quote!(fn t() {})).unwrap();
        assert!(out.contains("\"custom name\""));
        assert!(out.contains("__SELFTEST_DESCRIPTOR_T"));
    }

    #[test]
    fn rejects_unsupported_signatures() {
        assert!(expand(quote!(), quote!(fn with_arg(x: u32) {})).is_err());
        assert!(expand(quote!(), quote!(fn generic<T>() {})).is_err());
        assert!(expand(quote!(), quote!(async fn later() {})).is_err());
    }

    #[test]
    fn rejects_qualifiers_the_wrapper_would_drop() {
        for item in [
            quote!(unsafe fn raw() {}),
            quote!(const fn folded() {}),
            quote!(extern "C" fn foreign() {}),
            quote!(unsafe fn raw_result() -> selftest::TestResult { Ok(()) }),
        ] {
            let err = expand(quote!(), item).unwrap_err();
            assert!(err.to_string().starts_with("a unit test cannot"));
        }
    }

    #[test]
    fn rejects_unknown_attributes() {
        let err = expand(quote!(ignore), quote!(fn t() {})).unwrap_err();
        assert!(err.to_string().contains("def_test"));
    }
}
