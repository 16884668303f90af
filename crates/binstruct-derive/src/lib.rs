//! Derive macros for the binstruct wire format.
//!
//! `#[derive(Encode, Decode)]` generates the per-record walk: fields are
//! visited in declaration order and each one is handed to the encoder or
//! decoder together with the directives from its `#[binstruct("...")]`
//! attribute. Directive strings are parsed here, at compile time, so an
//! unknown token is a compile error pointing at the attribute.
//!
//! ```ignore
//! #[derive(Encode, Decode, Default)]
//! struct Login {
//!     user: String,
//!     #[binstruct("count16,[len32]")]
//!     roles: Vec<Role>,
//!     #[binstruct("-")]
//!     cached: u64,
//!     #[binstruct("end")]
//!     session: u32,
//! }
//! ```

use binstruct_directive::Directives;
use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, parse_quote, spanned::Spanned, Data, DeriveInput, Error, Field, Fields,
    GenericParam, Generics, Ident, Index, LitStr, Member, Type,
};

/// Generate a `binstruct::Encode` implementation for a struct.
#[proc_macro_derive(Encode, attributes(binstruct))]
pub fn derive_encode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_encode(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// Generate a `binstruct::Decode` implementation for a struct.
///
/// Skipped fields, and every field from the first `end`-tagged field onward,
/// must implement `Default`.
#[proc_macro_derive(Decode, attributes(binstruct))]
pub fn derive_decode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_decode(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

enum Shape {
    Named,
    Unnamed,
    Unit,
}

struct FieldPlan {
    member: Member,
    binding: Ident,
    label: String,
    ty: Type,
    directives: Directives,
}

fn collect_fields(input: &DeriveInput) -> Result<(Shape, Vec<FieldPlan>), Error> {
    let data = match &input.data {
        Data::Struct(data) => data,
        Data::Enum(data) => {
            return Err(Error::new(
                data.enum_token.span(),
                "binstruct derives only support structs",
            ));
        }
        Data::Union(data) => {
            return Err(Error::new(
                data.union_token.span(),
                "binstruct derives only support structs",
            ));
        }
    };

    let shape = match &data.fields {
        Fields::Named(_) => Shape::Named,
        Fields::Unnamed(_) => Shape::Unnamed,
        Fields::Unit => Shape::Unit,
    };

    let mut plans = Vec::with_capacity(data.fields.len());
    for (index, field) in data.fields.iter().enumerate() {
        let (member, label) = match &field.ident {
            Some(ident) => (Member::Named(ident.clone()), ident.to_string()),
            None => (Member::Unnamed(Index::from(index)), index.to_string()),
        };
        plans.push(FieldPlan {
            member,
            binding: format_ident!("__field{}", index),
            label,
            ty: field.ty.clone(),
            directives: field_directives(field)?,
        });
    }

    Ok((shape, plans))
}

fn field_directives(field: &Field) -> Result<Directives, Error> {
    let mut found: Option<Directives> = None;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("binstruct")) {
        if found.is_some() {
            return Err(Error::new(
                attr.span(),
                "duplicate #[binstruct] attribute; combine tokens with commas",
            ));
        }
        let lit: LitStr = attr.parse_args()?;
        let directives = Directives::parse(&lit.value())
            .map_err(|err| Error::new(lit.span(), err.to_string()))?;
        found = Some(directives);
    }
    Ok(found.unwrap_or(Directives::NONE))
}

fn directive_tokens(directives: &Directives) -> TokenStream2 {
    let skip = directives.is_skipped();
    let own = directives.own().bits();
    let element = directives.element_framing().bits();
    quote! { ::binstruct::Directives::from_bits(#skip, #own, #element) }
}

fn with_bound(mut generics: Generics, bound: syn::TypeParamBound) -> Generics {
    for param in &mut generics.params {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(bound.clone());
        }
    }
    generics
}

fn expand_encode(input: DeriveInput) -> Result<TokenStream2, Error> {
    let (_, fields) = collect_fields(&input)?;
    let name = &input.ident;
    let generics = with_bound(input.generics.clone(), parse_quote!(::binstruct::Encode));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let writes = fields
        .iter()
        .filter(|field| !field.directives.is_skipped())
        .map(|field| {
            let member = &field.member;
            let directives = directive_tokens(&field.directives);
            quote! { encoder.encode_value(&self.#member, #directives)?; }
        });

    Ok(quote! {
        impl #impl_generics ::binstruct::Encode for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn encode(
                &self,
                encoder: &mut ::binstruct::Encoder,
                _directives: ::binstruct::Directives,
            ) -> ::binstruct::Result<()> {
                #(#writes)*
                ::core::result::Result::Ok(())
            }
        }
    })
}

fn expand_decode(input: DeriveInput) -> Result<TokenStream2, Error> {
    let (shape, fields) = collect_fields(&input)?;
    let name = &input.ident;
    let generics = with_bound(input.generics.clone(), parse_quote!(::binstruct::Decode));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let has_end = fields
        .iter()
        .any(|field| !field.directives.is_skipped() && field.directives.is_optional_end());
    let stop_decl = has_end.then(|| quote! { let mut __stop = false; });

    let mut past_end = false;
    let mut reads = Vec::with_capacity(fields.len());
    for field in &fields {
        let binding = &field.binding;
        let ty = &field.ty;
        let directives = directive_tokens(&field.directives);
        let default = quote! { ::core::default::Default::default() };
        let read = quote! { decoder.decode_value::<#ty>(#directives)? };

        let stmt = if field.directives.is_skipped() {
            quote! { let #binding: #ty = #default; }
        } else if field.directives.is_optional_end() {
            past_end = true;
            let label = LitStr::new(&field.label, Span::call_site());
            quote! {
                let #binding: #ty = if __stop || decoder.at_optional_end(#label) {
                    __stop = true;
                    #default
                } else {
                    #read
                };
            }
        } else if past_end {
            quote! { let #binding: #ty = if __stop { #default } else { #read }; }
        } else {
            quote! { let #binding: #ty = #read; }
        };
        reads.push(stmt);
    }

    let bindings = fields.iter().map(|field| &field.binding);
    let construct = match shape {
        Shape::Named => {
            let members = fields.iter().map(|field| &field.member);
            quote! { Self { #(#members: #bindings),* } }
        }
        Shape::Unnamed => quote! { Self(#(#bindings),*) },
        Shape::Unit => quote! { Self },
    };

    Ok(quote! {
        impl #impl_generics ::binstruct::Decode for #name #ty_generics #where_clause {
            #[allow(unused_assignments, unused_variables)]
            fn decode(
                decoder: &mut ::binstruct::Decoder<'_, '_>,
                _directives: ::binstruct::Directives,
            ) -> ::binstruct::Result<Self> {
                #stop_decl
                #(#reads)*
                ::core::result::Result::Ok(#construct)
            }
        }
    })
}
