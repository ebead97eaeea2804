use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, Ident, ItemFn, ReturnType, Type};

/// Expands `#[fleetdesk_runtime::main]`.
#[must_use]
pub fn expand_main(args: TokenStream, input: ItemFn) -> TokenStream {
    if input.sig.asyncness.is_none() {
        return Error::new_spanned(
            &input.sig.ident,
            "#[fleetdesk_runtime::main] can only be used on async functions",
        )
        .to_compile_error();
    }

    if !returns_result(&input.sig.output) {
        return Error::new_spanned(
            &input.sig.output,
            "#[fleetdesk_runtime::main] requires a Result return type",
        )
        .to_compile_error();
    }

    let profile = match parse_profile(args) {
        Ok(profile) => profile,
        Err(err) => return err.to_compile_error(),
    };

    let name = &input.sig.ident;
    let body = &input.block;
    let vis = &input.vis;
    let attrs = &input.attrs;
    let output = &input.sig.output;

    quote! {
        #(#attrs)*
        #vis fn #name() #output {
            let rt = ::fleetdesk_runtime::build_runtime(::fleetdesk_runtime::Profile::#profile)?;
            rt.block_on(async { #body })
        }
    }
}

fn parse_profile(args: TokenStream) -> Result<Ident, Error> {
    if args.is_empty() {
        return Ok(Ident::new("Default", proc_macro2::Span::call_site()));
    }

    let ident: Ident = syn::parse2(args)?;
    let variant = match ident.to_string().as_str() {
        "event_loop" => "EventLoop",
        "default" => "Default",
        _ => {
            return Err(Error::new_spanned(
                ident,
                "Unknown runtime profile. Use: event_loop or default",
            ));
        },
    };
    Ok(Ident::new(variant, ident.span()))
}

fn returns_result(output: &ReturnType) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    let Type::Path(path) = &**ty else {
        return false;
    };
    path.path.segments.last().is_some_and(|seg| seg.ident == "Result")
}
